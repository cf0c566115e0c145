//! Visit tracking.
//!
//! A visit is one browser session. Its id lives in the `mb_visit` cookie,
//! which carries no `Max-Age`, so the browser drops it on restart while the
//! `mb_session` cookie survives. Per-visit storage is keyed by this id (see
//! `crate::storage::SessionStorage::visit`).

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderValue, header, request::Parts},
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::{Cookie, SameSite};
use uuid::Uuid;

use crate::error::AppError;

/// Visit cookie name.
pub const VISIT_COOKIE_NAME: &str = "mb_visit";

/// The current visit, available to handlers as an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for VisitId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::Internal("visit middleware not installed".to_owned()))
    }
}

/// Middleware that reads the visit cookie, or starts a new visit.
///
/// `secure` marks a newly issued cookie `Secure`.
pub async fn visit_middleware(
    State(secure): State<bool>,
    mut request: Request,
    next: Next,
) -> Response {
    let existing = request
        .headers()
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == VISIT_COOKIE_NAME && Uuid::parse_str(c.value()).is_ok())
        .map(|c| c.value().to_owned());

    let (visit_id, is_new) = match existing {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };
    request.extensions_mut().insert(VisitId(visit_id.clone()));

    let mut response = next.run(request).await;
    if is_new {
        let cookie = Cookie::build((VISIT_COOKIE_NAME, visit_id))
            .path("/")
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Lax)
            .build();
        if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, middleware::from_fn_with_state, routing::get};
    use tower::ServiceExt;

    use super::*;

    fn router() -> Router {
        Router::new()
            .route("/", get(|VisitId(id): VisitId| async move { id }))
            .layer(from_fn_with_state(false, visit_middleware))
    }

    async fn body(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_new_visit_sets_session_cookie() {
        let request = axum::http::Request::builder()
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        let set_cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .to_owned();
        assert!(set_cookie.starts_with("mb_visit="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(!set_cookie.to_ascii_lowercase().contains("max-age"));
        assert!(!set_cookie.to_ascii_lowercase().contains("expires"));

        let id = body(response).await;
        assert!(set_cookie.contains(&id));
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_existing_visit_is_kept() {
        let id = Uuid::new_v4().to_string();
        let request = axum::http::Request::builder()
            .uri("/")
            .header(header::COOKIE, format!("mb_session=abc; mb_visit={id}"))
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body(response).await, id);
    }

    #[tokio::test]
    async fn test_malformed_visit_is_replaced() {
        let request = axum::http::Request::builder()
            .uri("/")
            .header(header::COOKIE, "mb_visit=not-a-uuid")
            .body(Body::empty())
            .unwrap();
        let response = router().oneshot(request).await.unwrap();

        assert!(response.headers().get(header::SET_COOKIE).is_some());
        assert_ne!(body(response).await, "not-a-uuid");
    }
}
