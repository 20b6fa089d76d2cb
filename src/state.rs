use std::sync::Arc;

use crate::config::Config;
use crate::db::{restaurant_repository::RestaurantRepository, user_repository::UserRepository};
use crate::engine::VoteEngine;
use crate::services::authenticator::Authenticator;
use crate::utils::jwt::{JwtKeyProvider, JwtKeys};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn UserRepository>,
    pub restaurant_repo: Arc<dyn RestaurantRepository>,
    pub votes: Arc<VoteEngine>,
    pub authenticator: Arc<dyn Authenticator>,
    pub jwt_keys: Arc<JwtKeys>,
    pub config: Arc<Config>,
}

impl JwtKeyProvider for AppState {
    fn jwt_keys(&self) -> &JwtKeys {
        &self.jwt_keys
    }
}
