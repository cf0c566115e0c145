//! Identity service.
//!
//! Accounts are created and verified by an [`IdentityProvider`]. The
//! storefront only ever sees the opaque uid and the email; profile data lives
//! in the `users` collection and is bound to the session on every sign-in
//! state change (see [`bind_session`]).

mod error;

pub use error::AuthError;

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use tower_sessions::Session;
use tracing::instrument;

use moda_brasil_core::{Email, UserId};

use crate::db::credentials::Credential;
use crate::db::{CredentialRepository, RepositoryError, UserRepository};
use crate::models::{CurrentUser, session_keys};
use crate::store::{DocumentStore, new_document_id};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// An authenticated account as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: UserId,
    pub email: Email,
}

/// A sign-in state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInState {
    SignedIn(Account),
    SignedOut,
}

/// Account creation and verification.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and return it signed in.
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, AuthError>;

    /// Verify credentials.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, AuthError>;

    /// End the account's provider-side session, if the provider keeps one.
    async fn sign_out(&self, uid: &UserId) -> Result<(), AuthError>;
}

/// Email/password accounts with Argon2id hashes kept in the document store.
pub struct PasswordIdentityProvider {
    store: Arc<dyn DocumentStore>,
}

impl PasswordIdentityProvider {
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityProvider for PasswordIdentityProvider {
    #[instrument(skip_all)]
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let uid = UserId::new(new_document_id());
        CredentialRepository::new(self.store.as_ref())
            .create(
                &uid,
                &Credential {
                    email: email.clone(),
                    password_hash,
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(uid = %uid, "Account created");
        Ok(Account { uid, email })
    }

    #[instrument(skip_all)]
    async fn sign_in(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let email = Email::parse(email)?;

        let (uid, credential) = CredentialRepository::new(self.store.as_ref())
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &credential.password_hash)?;

        Ok(Account {
            uid,
            email: credential.email,
        })
    }

    async fn sign_out(&self, _uid: &UserId) -> Result<(), AuthError> {
        // Password accounts have no provider-side session.
        Ok(())
    }
}

/// Keep the session's current user in sync with a sign-in state change.
///
/// On sign-in the matching profile is loaded from `users`; a missing profile
/// is normal (e.g. between account creation and profile creation) and leaves
/// `profile` empty. On sign-out the current user is removed.
///
/// # Errors
///
/// Returns `AuthError::Repository` if the profile lookup fails.
/// Returns `AuthError::Session` if the session cannot be written.
pub async fn bind_session(
    store: &dyn DocumentStore,
    session: &Session,
    state: SignInState,
) -> Result<Option<CurrentUser>, AuthError> {
    match state {
        SignInState::SignedIn(account) => {
            let profile = UserRepository::new(store).get(&account.uid).await?;
            let current = CurrentUser {
                uid: account.uid,
                email: account.email,
                profile,
            };
            session.insert(session_keys::CURRENT_USER, &current).await?;
            Ok(Some(current))
        }
        SignInState::SignedOut => {
            session
                .remove::<CurrentUser>(session_keys::CURRENT_USER)
                .await?;
            Ok(None)
        }
    }
}

/// Validate password requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
