//! User profile management commands.
//!
//! The API refuses self-registered admins; this is how the first admin is
//! created.

use moda_brasil_core::{UserId, UserRole};
use moda_brasil_storefront::db::{RepositoryError, UserRepository};
use moda_brasil_storefront::store::PgDocumentStore;

use super::{CommandError, connect};

/// Change a profile's role.
///
/// # Errors
///
/// Returns `CommandError::UserNotFound` if no profile exists for `uid`.
pub async fn set_role(uid: &str, role: UserRole) -> Result<(), CommandError> {
    let store = PgDocumentStore::new(connect().await?);

    UserRepository::new(&store)
        .set_role(&UserId::new(uid), role)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => CommandError::UserNotFound(uid.to_owned()),
            other => CommandError::Repository(other),
        })?;

    tracing::info!(uid, %role, "Role updated");
    Ok(())
}
