//! Referral-code extraction from page URLs.
//!
//! Share links put the query either before the client-side route fragment
//! (`/?ref=ANA1234#/login`) or after it (`/#/product/7?seller=uid`), and some
//! messaging apps mangle the URL on the way. Lookup therefore tries three
//! sources in order and the first non-empty value wins:
//!
//! 1. the router's parsed query (or the query inside the fragment),
//! 2. the URL's real query string,
//! 3. a `[?&]name=value` pattern over the raw URL.

use std::collections::HashMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Query parameter carrying an affiliate code.
pub const REF_PARAM: &str = "ref";

/// Legacy query parameter carrying a storefront partner's uid.
pub const SELLER_PARAM: &str = "seller";

/// Where the visitor currently is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralLocation {
    /// Full page URL, fragment included.
    pub url: String,
    /// Query parameters already parsed by the client router, if any.
    #[serde(default)]
    pub route_query: Option<HashMap<String, String>>,
}

impl ReferralLocation {
    /// Location from a bare URL with no router-parsed parameters.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            route_query: None,
        }
    }
}

/// Find the affiliate code (`ref`) for a location.
#[must_use]
pub fn find_referral_code(location: &ReferralLocation) -> Option<String> {
    find_param(location, REF_PARAM)
}

/// Find the legacy partner uid (`seller`) for a location.
#[must_use]
pub fn find_seller_param(location: &ReferralLocation) -> Option<String> {
    find_param(location, SELLER_PARAM)
}

/// Path component of the page URL, used as the click origin.
#[must_use]
pub fn origin_path(url: &str) -> String {
    Url::parse(url).map_or_else(|_| "/".to_owned(), |u| u.path().to_owned())
}

fn find_param(location: &ReferralLocation, name: &str) -> Option<String> {
    from_route_query(location, name)
        .or_else(|| from_query_string(&location.url, name))
        .or_else(|| from_pattern(&location.url, name))
}

fn from_route_query(location: &ReferralLocation, name: &str) -> Option<String> {
    if let Some(query) = &location.route_query {
        return query.get(name).filter(|v| !v.is_empty()).cloned();
    }

    let (_, fragment) = location.url.split_once('#')?;
    let (_, query) = fragment.split_once('?')?;
    lookup_pair(query, name)
}

fn from_query_string(url: &str, name: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .query_pairs()
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn from_pattern(url: &str, name: &str) -> Option<String> {
    let pattern = Regex::new(&format!(r"[?&]{}=([^&#]+)", regex::escape(name))).ok()?;
    pattern
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
}

fn lookup_pair(query: &str, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_code_before_fragment() {
        let loc = ReferralLocation::from_url("https://modabrasil.com.br/?ref=ANA1234#/login");
        assert_eq!(find_referral_code(&loc).as_deref(), Some("ANA1234"));
    }

    #[test]
    fn test_code_after_fragment() {
        let loc = ReferralLocation::from_url("https://modabrasil.com.br/#/login?ref=BRUN9X1Z");
        assert_eq!(find_referral_code(&loc).as_deref(), Some("BRUN9X1Z"));
    }

    #[test]
    fn test_router_query_wins() {
        let loc = ReferralLocation {
            url: "https://modabrasil.com.br/?ref=FROMURL".to_owned(),
            route_query: Some(HashMap::from([("ref".to_owned(), "FROMROUTER".to_owned())])),
        };
        assert_eq!(find_referral_code(&loc).as_deref(), Some("FROMROUTER"));
    }

    #[test]
    fn test_empty_router_value_falls_through() {
        let loc = ReferralLocation {
            url: "https://modabrasil.com.br/?ref=FROMURL".to_owned(),
            route_query: Some(HashMap::from([("ref".to_owned(), String::new())])),
        };
        assert_eq!(find_referral_code(&loc).as_deref(), Some("FROMURL"));
    }

    #[test]
    fn test_pattern_fallback_for_unparseable_url() {
        let loc = ReferralLocation::from_url("modabrasil.com.br/promo?x=1&ref=CARLA42&y=2");
        assert_eq!(find_referral_code(&loc).as_deref(), Some("CARLA42"));
    }

    #[test]
    fn test_no_code() {
        let loc = ReferralLocation::from_url("https://modabrasil.com.br/#/cart");
        assert_eq!(find_referral_code(&loc), None);

        let loc = ReferralLocation::from_url("https://modabrasil.com.br/?ref=#/login");
        assert_eq!(find_referral_code(&loc), None);
    }

    #[test]
    fn test_seller_param_is_independent() {
        let loc = ReferralLocation::from_url("https://modabrasil.com.br/#/product/7?seller=uid-42");
        assert_eq!(find_seller_param(&loc).as_deref(), Some("uid-42"));
        assert_eq!(find_referral_code(&loc), None);
    }

    #[test]
    fn test_origin_path() {
        assert_eq!(origin_path("https://modabrasil.com.br/loja/?ref=A#/login"), "/loja/");
        assert_eq!(origin_path("not a url"), "/");
    }
}
