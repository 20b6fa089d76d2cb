pub mod auth;
pub mod health;
pub mod restaurants;
pub mod users;
pub mod votes;

use axum::{
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{AppError, MSG_BAD_DATE, MSG_BAD_ID};
use crate::state::AppState;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Every endpoint, relative to `/api/v1`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/token",
            get(auth::handle_token).post(auth::handle_token),
        )
        .route("/users", get(users::list_users).post(users::register_user))
        .route(
            "/users/{user_id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/restaurant",
            get(restaurants::list_restaurants).post(restaurants::create_restaurant),
        )
        .route("/restaurant/menus", get(restaurants::list_menus_by_date))
        .route("/restaurant/votes", get(votes::list_votes))
        .route(
            "/restaurant/{restaurant_id}",
            get(restaurants::get_restaurant).delete(restaurants::delete_restaurant),
        )
        .route(
            "/restaurant/{restaurant_id}/menu",
            get(restaurants::list_menus).post(restaurants::upsert_menu),
        )
        .route(
            "/restaurant/{restaurant_id}/menu/{menu_id}",
            get(restaurants::get_menu),
        )
        .route(
            "/restaurant/{restaurant_id}/menu/{menu_id}/vote",
            post(votes::cast_vote),
        )
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .with_state(state)
}

pub fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidInput(MSG_BAD_ID.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

impl DateQuery {
    /// `None` when the parameter is absent or empty; callers default to today.
    pub fn parse(&self) -> Result<Option<NaiveDate>, AppError> {
        match self.date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(Some)
                .map_err(|_| AppError::InvalidInput(MSG_BAD_DATE.to_string())),
        }
    }

    pub fn or_today(&self) -> Result<NaiveDate, AppError> {
        Ok(self
            .parse()?
            .unwrap_or_else(|| chrono::Utc::now().date_naive()))
    }
}
