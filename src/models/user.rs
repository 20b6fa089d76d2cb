use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_USER: &str = "USER";

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    #[sqlx(rename = "user_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub roles: Vec<String>,
    #[sqlx(rename = "date_created")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "date_updated")]
    pub updated_at: DateTime<Utc>,
}

/// Registration payload for `POST /users`.
#[derive(Debug, Deserialize, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Partial update for `PUT /users/{id}`. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Option<Vec<String>>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
}
