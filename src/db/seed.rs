use chrono::{NaiveDate, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::{ROLE_ADMIN, ROLE_USER};
use crate::utils::password::hash_password;

pub const SEED_PASSWORD: &str = "gophers";

const ADMIN_ID: Uuid = Uuid::from_u128(0x5cf37266_3473_4006_984f_9325122678b7);
const USER_ID: Uuid = Uuid::from_u128(0x45b5fbd3_755f_4379_8f07_a58d4a30fa2f);
const LOKYS_ID: Uuid = Uuid::from_u128(0x5828612a_1f8a_403c_b6d1_6cb66fbf0c66);

const RESTAURANTS: [(Uuid, &str, &str); 5] = [
    (
        Uuid::from_u128(0x0ce90028_69cb_4e9c_9af0_7bbada50d5b6),
        "Paikis",
        "A. Smetonos g. 5, Vilnius 01115",
    ),
    (
        Uuid::from_u128(0x71b8fb90_24eb_4012_9048_3ba210aac0f6),
        "Seeet Root",
        "Užupio g. 22, Vilnius 01203",
    ),
    (
        Uuid::from_u128(0x2df32931_3072_4d11_8109_d1f0988c26b3),
        "Lauro lapas",
        "Pamėnkalnio g. 24, Vilnius 01114",
    ),
    (
        Uuid::from_u128(0x8800c4d0_0219_49d5_9eb0_db457ee015e5),
        "Mykolo 4",
        "Šv. Mykolo g. 4, Vilnius 01124",
    ),
    (LOKYS_ID, "Lokys", "Stiklių g. 10, Vilnius 01131"),
];

const MENUS: [(Uuid, (i32, u32, u32), &str); 2] = [
    (
        Uuid::from_u128(0x4058d981_0df1_45de_807e_b8e90bcb2d80),
        (2020, 3, 1),
        "Lokys menu for 2020-03-01",
    ),
    (
        Uuid::from_u128(0xf70a7f9a_e41a_47e5_b56c_444646df77bc),
        (2020, 3, 2),
        "Lokys menu for 2020-03-02",
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to hash seed password: {0}")]
    Hash(argon2::password_hash::Error),
    #[error("invalid seed date {0:?}")]
    Date((i32, u32, u32)),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Loads the demo data set. Safe to run repeatedly; existing rows are kept.
pub async fn seed(pool: &PgPool) -> Result<(), SeedError> {
    let created = Utc
        .with_ymd_and_hms(2019, 3, 24, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let password_hash = hash_password(SEED_PASSWORD).map_err(SeedError::Hash)?;

    let mut tx = pool.begin().await?;

    let users = [
        (
            ADMIN_ID,
            "Admin Gopher",
            "admin@example.com",
            vec![ROLE_ADMIN.to_string(), ROLE_USER.to_string()],
        ),
        (
            USER_ID,
            "User Gopher",
            "user@example.com",
            vec![ROLE_USER.to_string()],
        ),
    ];
    for (id, name, email, roles) in users {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, name, email, roles, password_hash, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(roles)
        .bind(&password_hash)
        .bind(created)
        .execute(&mut *tx)
        .await?;
    }

    for (id, name, address) in RESTAURANTS {
        sqlx::query(
            r#"
            INSERT INTO restaurant (restaurant_id, name, address, owner_user_id, date_created, date_updated)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(address)
        .bind(ADMIN_ID)
        .bind(created)
        .execute(&mut *tx)
        .await?;
    }

    for (id, ymd, content) in MENUS {
        let date = NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).ok_or(SeedError::Date(ymd))?;
        sqlx::query(
            r#"
            INSERT INTO menu (menu_id, restaurant_id, date, menu, votes)
            VALUES ($1, $2, $3, $4, 0)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(LOKYS_ID)
        .bind(date)
        .bind(content)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::info!("seed data loaded");
    Ok(())
}
