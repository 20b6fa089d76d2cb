use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{restaurant::Menu, vote::Vote};

/// One open unit of work against the vote ledger. Dropping it without
/// calling `commit` must discard every write made through it.
#[async_trait]
pub trait VoteTransaction: Send {
    async fn count_votes(&mut self, date: NaiveDate, user_id: Uuid) -> Result<i64, sqlx::Error>;
    async fn insert_vote(&mut self, vote: &Vote) -> Result<(), sqlx::Error>;
    /// `votes = votes + 1`; returns the number of menu rows touched.
    async fn increment_menu_votes(&mut self, menu_id: Uuid) -> Result<u64, sqlx::Error>;
    async fn commit(self: Box<Self>) -> Result<(), sqlx::Error>;
    async fn rollback(self: Box<Self>) -> Result<(), sqlx::Error>;
}

/// Durable record of who voted on which ballot day, keyed by (date, user).
#[async_trait]
pub trait VoteLedger: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn VoteTransaction>, sqlx::Error>;
    async fn menus_with_votes(&self, date: NaiveDate) -> Result<Vec<Menu>, sqlx::Error>;
}
