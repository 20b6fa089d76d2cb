use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::restaurant::{Menu, NewRestaurant, Restaurant, UpsertMenu};

#[derive(Debug, Clone, PartialEq)]
pub enum MenuUpsert {
    Created(Menu),
    Updated(Menu),
}

/// Plain reads and writes for restaurants and their menus. Nothing here
/// touches `menu.votes`; that counter belongs to the vote engine.
#[async_trait]
pub trait RestaurantRepository: Send + Sync {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, sqlx::Error>;
    async fn find_restaurant(&self, restaurant_id: Uuid)
        -> Result<Option<Restaurant>, sqlx::Error>;
    async fn create_restaurant(
        &self,
        owner_user_id: Uuid,
        restaurant: &NewRestaurant,
    ) -> Result<Restaurant, sqlx::Error>;
    async fn delete_restaurant(&self, restaurant_id: Uuid) -> Result<bool, sqlx::Error>;

    /// Newest first.
    async fn list_menus_for_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<Menu>, sqlx::Error>;
    async fn find_menu(
        &self,
        restaurant_id: Uuid,
        menu_id: Uuid,
    ) -> Result<Option<Menu>, sqlx::Error>;
    async fn list_menus_by_date(&self, date: NaiveDate) -> Result<Vec<Menu>, sqlx::Error>;
    /// Creates the (restaurant, date) menu or replaces its content. An explicit
    /// `menu.id` that does not belong to the restaurant yields `RowNotFound`.
    async fn upsert_menu(
        &self,
        restaurant_id: Uuid,
        menu: &UpsertMenu,
    ) -> Result<MenuUpsert, sqlx::Error>;
}
