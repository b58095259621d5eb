//! User repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::{RecordId, User};

/// Repository trait for user records.
///
/// Users are inserted once and never updated or deleted. Usernames are
/// stored verbatim and are not required to be unique.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user.
    ///
    /// # Arguments
    /// * `username` - Display name exactly as submitted (may be absent)
    ///
    /// # Returns
    /// * `Ok(User)` - The stored record including its generated id
    /// * `Err(RepositoryError)` - If the insert fails
    async fn create_user(&self, username: Option<String>) -> RepositoryResult<User>;

    /// List every stored user in insertion order.
    async fn list_users(&self) -> RepositoryResult<Vec<User>>;

    /// Look up a user by id.
    ///
    /// # Returns
    /// * `Ok(Some(User))` - The user exists
    /// * `Ok(None)` - No user has this id
    /// * `Err(RepositoryError)` - If the lookup fails
    async fn find_user(&self, id: RecordId) -> RepositoryResult<Option<User>>;
}
