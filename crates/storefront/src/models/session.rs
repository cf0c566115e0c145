//! Session-related types.

use serde::{Deserialize, Serialize};

use moda_brasil_core::{Email, UserId};

use super::UserProfile;

/// Session-stored identity of the signed-in account.
///
/// `profile` is `None` until a profile document exists for the uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub uid: UserId,
    pub email: Email,
    pub profile: Option<UserProfile>,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";
}
