use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use crate::db::user_repository::UserRepository;
use crate::models::user::User;
use crate::routes::auth::claims::Claims;
use crate::utils::jwt::{create_jwt, JwtKeys, TokenError};
use crate::utils::password::verify_password;

/// Default access token lifetime in seconds.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email and wrong password are indistinguishable to the caller.
    #[error("AuthenticationFailed")]
    AuthenticationFailed,
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(#[source] sqlx::Error),
    #[error(transparent)]
    Token(#[from] TokenError),
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Checks `password` against the stored hash for `email` and returns
    /// fresh claims for the account.
    async fn authenticate(&self, email: &str, password: &str)
        -> Result<(Claims, User), AuthError>;

    /// `authenticate`, then sign the claims.
    async fn new_token(&self, email: &str, password: &str) -> Result<(String, User), AuthError>;
}

pub struct DefaultAuthenticator {
    users: Arc<dyn UserRepository>,
    keys: Arc<JwtKeys>,
    ttl: Duration,
}

impl DefaultAuthenticator {
    pub fn new(users: Arc<dyn UserRepository>, keys: Arc<JwtKeys>, ttl: Duration) -> Self {
        Self { users, keys, ttl }
    }
}

#[async_trait]
impl Authenticator for DefaultAuthenticator {
    async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Claims, User), AuthError> {
        let user = match self.users.find_user_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!(%email, "login for unknown email");
                return Err(AuthError::AuthenticationFailed);
            }
            Err(err) => return Err(AuthError::StoreUnavailable(err)),
        };

        match verify_password(password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!(user_id = %user.id, "login with wrong password");
                return Err(AuthError::AuthenticationFailed);
            }
            Err(err) => {
                warn!(user_id = %user.id, ?err, "stored password hash is unreadable");
                return Err(AuthError::AuthenticationFailed);
            }
        }

        let claims = Claims::new(&user, Utc::now(), self.ttl);
        Ok((claims, user))
    }

    async fn new_token(&self, email: &str, password: &str) -> Result<(String, User), AuthError> {
        let (claims, user) = self.authenticate(email, password).await?;
        let token = create_jwt(&claims, &self.keys)?;
        Ok((token, user))
    }
}
