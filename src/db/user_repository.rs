use async_trait::async_trait;
use uuid::Uuid;

use crate::models::user::User;

/// Credential store. The auth core only ever reads through it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_id(&self, user_id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error>;
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        roles: &[String],
    ) -> Result<User, sqlx::Error>;
    /// Writes name, email, roles and password hash. `None` when the user is gone.
    async fn update_user(&self, user: &User) -> Result<Option<User>, sqlx::Error>;
    async fn delete_user(&self, user_id: Uuid) -> Result<bool, sqlx::Error>;
    /// Round trip to the backing store; used by the health check.
    async fn status_check(&self) -> Result<(), sqlx::Error>;
}
