use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Restaurant {
    #[sqlx(rename = "restaurant_id")]
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub owner_user_id: Uuid,
    #[sqlx(rename = "date_created")]
    pub created_at: DateTime<Utc>,
    #[sqlx(rename = "date_updated")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct NewRestaurant {
    pub name: String,
    #[serde(default)]
    pub address: String,
}

/// A restaurant's offer for one calendar day. `votes` is only ever written by
/// the vote engine.
#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Menu {
    #[sqlx(rename = "menu_id")]
    pub id: Uuid,
    pub restaurant_id: Uuid,
    pub date: NaiveDate,
    #[sqlx(rename = "menu")]
    #[serde(rename = "menu")]
    pub content: String,
    pub votes: i32,
}

/// Upsert payload for `POST /restaurant/{id}/menu`. When `id` is absent the
/// menu for (restaurant, date) is created or, if one exists, replaced.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpsertMenu {
    pub id: Option<Uuid>,
    pub date: NaiveDate,
    #[serde(rename = "menu")]
    pub content: String,
}
