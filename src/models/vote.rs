use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One vote attempt as handed to the vote engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ballot {
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub menu_id: Uuid,
    pub date: NaiveDate,
}

impl Ballot {
    /// `time_voted` is pinned to the ballot day, not the wall clock.
    pub fn cast_at(&self) -> DateTime<Utc> {
        self.date.and_time(chrono::NaiveTime::MIN).and_utc()
    }
}

#[derive(Debug, FromRow, Serialize, Deserialize, Clone, PartialEq)]
pub struct Vote {
    pub date: NaiveDate,
    pub user_id: Uuid,
    pub restaurant_id: Uuid,
    pub menu_id: Uuid,
    #[sqlx(rename = "time_voted")]
    pub cast_at: DateTime<Utc>,
}

impl From<&Ballot> for Vote {
    fn from(ballot: &Ballot) -> Self {
        Vote {
            date: ballot.date,
            user_id: ballot.user_id,
            restaurant_id: ballot.restaurant_id,
            menu_id: ballot.menu_id,
            cast_at: ballot.cast_at(),
        }
    }
}
