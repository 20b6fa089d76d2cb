use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::restaurant_repository::{MenuUpsert, RestaurantRepository},
    models::restaurant::{Menu, NewRestaurant, Restaurant, UpsertMenu},
};

const RESTAURANT_COLUMNS: &str =
    "restaurant_id, name, address, owner_user_id, date_created, date_updated";
pub(crate) const MENU_COLUMNS: &str = "menu_id, restaurant_id, date, menu, votes";

pub struct PostgresRestaurantRepository {
    pub pool: PgPool,
}

#[async_trait]
impl RestaurantRepository for PostgresRestaurantRepository {
    async fn list_restaurants(&self) -> Result<Vec<Restaurant>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurant ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn find_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Option<Restaurant>, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {RESTAURANT_COLUMNS} FROM restaurant WHERE restaurant_id = $1"
        ))
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_restaurant(
        &self,
        owner_user_id: Uuid,
        restaurant: &NewRestaurant,
    ) -> Result<Restaurant, sqlx::Error> {
        sqlx::query_as::<_, Restaurant>(&format!(
            r#"
            INSERT INTO restaurant (restaurant_id, name, address, owner_user_id, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING {RESTAURANT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&restaurant.name)
        .bind(&restaurant.address)
        .bind(owner_user_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_restaurant(&self, restaurant_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM restaurant WHERE restaurant_id = $1")
            .bind(restaurant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_menus_for_restaurant(
        &self,
        restaurant_id: Uuid,
    ) -> Result<Vec<Menu>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menu WHERE restaurant_id = $1 ORDER BY date DESC"
        ))
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn find_menu(
        &self,
        restaurant_id: Uuid,
        menu_id: Uuid,
    ) -> Result<Option<Menu>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menu WHERE restaurant_id = $1 AND menu_id = $2"
        ))
        .bind(restaurant_id)
        .bind(menu_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_menus_by_date(&self, date: NaiveDate) -> Result<Vec<Menu>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menu WHERE date = $1 ORDER BY restaurant_id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
    }

    async fn upsert_menu(
        &self,
        restaurant_id: Uuid,
        menu: &UpsertMenu,
    ) -> Result<MenuUpsert, sqlx::Error> {
        if let Some(menu_id) = menu.id {
            // votes stay untouched
            return sqlx::query_as::<_, Menu>(&format!(
                r#"
                UPDATE menu SET menu = $3, date = $4
                WHERE menu_id = $1 AND restaurant_id = $2
                RETURNING {MENU_COLUMNS}
                "#
            ))
            .bind(menu_id)
            .bind(restaurant_id)
            .bind(&menu.content)
            .bind(menu.date)
            .fetch_optional(&self.pool)
            .await?
            .map(MenuUpsert::Updated)
            .ok_or(sqlx::Error::RowNotFound);
        }

        // xmax = 0 only for a freshly inserted row
        let (created, row): (bool, Menu) = {
            let record = sqlx::query_as::<_, MenuUpsertRow>(&format!(
                r#"
                INSERT INTO menu (menu_id, restaurant_id, date, menu, votes)
                VALUES ($1, $2, $3, $4, 0)
                ON CONFLICT (restaurant_id, date) DO UPDATE SET menu = EXCLUDED.menu
                RETURNING {MENU_COLUMNS}, (xmax = 0) AS inserted
                "#
            ))
            .bind(Uuid::new_v4())
            .bind(restaurant_id)
            .bind(menu.date)
            .bind(&menu.content)
            .fetch_one(&self.pool)
            .await?;
            (record.inserted, record.menu)
        };

        Ok(if created {
            MenuUpsert::Created(row)
        } else {
            MenuUpsert::Updated(row)
        })
    }
}

#[derive(sqlx::FromRow)]
struct MenuUpsertRow {
    #[sqlx(flatten)]
    menu: Menu,
    inserted: bool,
}
