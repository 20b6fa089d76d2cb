use std::{fmt, sync::Arc};

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    db::{
        is_foreign_key_violation, is_unique_violation,
        vote_repository::{VoteLedger, VoteTransaction},
    },
    models::{restaurant::Menu, vote::Ballot, vote::Vote},
};

/// Progress of a single vote attempt. Only `Committed` is externally visible;
/// every failure ends in `Aborted` with nothing written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteStage {
    Start,
    Checked,
    Recorded,
    Committed,
    Aborted,
}

impl fmt::Display for VoteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VoteStage::Start => "start",
            VoteStage::Checked => "checked",
            VoteStage::Recorded => "recorded",
            VoteStage::Committed => "committed",
            VoteStage::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("user has already voted today")]
    AlreadyVoted,
    #[error("menu {0} not found")]
    MenuNotFound(Uuid),
    /// `stage` is the last stage reached before the store failed.
    #[error("vote store failure after stage {stage}: {source}")]
    Store {
        stage: VoteStage,
        #[source]
        source: sqlx::Error,
    },
}

/// Enforces one accepted vote per user per ballot day and keeps
/// `menu.votes` in step with the ledger.
#[derive(Clone)]
pub struct VoteEngine {
    ledger: Arc<dyn VoteLedger>,
}

impl VoteEngine {
    pub fn new(ledger: Arc<dyn VoteLedger>) -> Self {
        Self { ledger }
    }

    /// `date` falls back to today (UTC). It is not compared with the menu's
    /// own date: a ballot day and a menu day are independent.
    pub async fn cast_vote(
        &self,
        user_id: Uuid,
        restaurant_id: Uuid,
        menu_id: Uuid,
        date: Option<NaiveDate>,
    ) -> Result<Vote, VoteError> {
        let ballot = Ballot {
            user_id,
            restaurant_id,
            menu_id,
            date: date.unwrap_or_else(|| Utc::now().date_naive()),
        };
        self.record(&ballot).await
    }

    /// Check, insert and increment inside one ledger transaction. The count
    /// check is the fast path; the ledger's (date, user) key is what actually
    /// settles a race, and a key clash is reported as `AlreadyVoted` too.
    pub async fn record(&self, ballot: &Ballot) -> Result<Vote, VoteError> {
        let mut stage = VoteStage::Start;
        let mut tx = self
            .ledger
            .begin()
            .await
            .map_err(|source| VoteError::Store { stage, source })?;

        let existing = match tx.count_votes(ballot.date, ballot.user_id).await {
            Ok(count) => count,
            Err(source) => return Err(abort(tx, ballot, VoteError::Store { stage, source }).await),
        };
        if existing > 0 {
            return Err(abort(tx, ballot, VoteError::AlreadyVoted).await);
        }
        stage = VoteStage::Checked;
        debug!(user_id = %ballot.user_id, date = %ballot.date, %stage, "vote check passed");

        let vote = Vote::from(ballot);
        if let Err(source) = tx.insert_vote(&vote).await {
            let reason = if is_unique_violation(&source) {
                VoteError::AlreadyVoted
            } else if is_foreign_key_violation(&source) {
                VoteError::MenuNotFound(ballot.menu_id)
            } else {
                VoteError::Store { stage, source }
            };
            return Err(abort(tx, ballot, reason).await);
        }
        stage = VoteStage::Recorded;
        debug!(user_id = %ballot.user_id, date = %ballot.date, %stage, "vote row inserted");

        match tx.increment_menu_votes(ballot.menu_id).await {
            Ok(0) => {
                return Err(abort(tx, ballot, VoteError::MenuNotFound(ballot.menu_id)).await);
            }
            Ok(_) => {}
            Err(source) => return Err(abort(tx, ballot, VoteError::Store { stage, source }).await),
        }

        tx.commit()
            .await
            .map_err(|source| VoteError::Store { stage, source })?;
        stage = VoteStage::Committed;

        info!(
            user_id = %ballot.user_id,
            restaurant_id = %ballot.restaurant_id,
            menu_id = %ballot.menu_id,
            date = %ballot.date,
            %stage,
            "vote accepted"
        );
        Ok(vote)
    }

    pub async fn votes_by_date(&self, date: NaiveDate) -> Result<Vec<Menu>, sqlx::Error> {
        self.ledger.menus_with_votes(date).await
    }
}

async fn abort(tx: Box<dyn VoteTransaction>, ballot: &Ballot, reason: VoteError) -> VoteError {
    if let Err(err) = tx.rollback().await {
        // the transaction is discarded on drop regardless
        warn!(?err, user_id = %ballot.user_id, "vote rollback failed");
    }
    debug!(
        user_id = %ballot.user_id,
        date = %ballot.date,
        stage = %VoteStage::Aborted,
        %reason,
        "vote aborted"
    );
    reason
}
