use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    db::{
        postgres_restaurant_repository::MENU_COLUMNS,
        vote_repository::{VoteLedger, VoteTransaction},
    },
    models::{restaurant::Menu, vote::Vote},
};

pub struct PostgresVoteLedger {
    pub pool: PgPool,
}

/// Wraps a sqlx transaction; sqlx rolls it back on drop, which is what makes
/// a cancelled request leave no trace.
pub struct PostgresVoteTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl VoteLedger for PostgresVoteLedger {
    async fn begin(&self) -> Result<Box<dyn VoteTransaction>, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresVoteTransaction { tx }))
    }

    async fn menus_with_votes(&self, date: NaiveDate) -> Result<Vec<Menu>, sqlx::Error> {
        sqlx::query_as::<_, Menu>(&format!(
            "SELECT {MENU_COLUMNS} FROM menu WHERE date = $1 ORDER BY votes DESC, restaurant_id"
        ))
        .bind(date)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl VoteTransaction for PostgresVoteTransaction {
    async fn count_votes(&mut self, date: NaiveDate, user_id: Uuid) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM vote WHERE date = $1 AND user_id = $2")
            .bind(date)
            .bind(user_id)
            .fetch_one(&mut *self.tx)
            .await
    }

    async fn insert_vote(&mut self, vote: &Vote) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO vote (date, user_id, restaurant_id, menu_id, time_voted)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(vote.date)
        .bind(vote.user_id)
        .bind(vote.restaurant_id)
        .bind(vote.menu_id)
        .bind(vote.cast_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn increment_menu_votes(&mut self, menu_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE menu SET votes = votes + 1 WHERE menu_id = $1")
            .bind(menu_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}
