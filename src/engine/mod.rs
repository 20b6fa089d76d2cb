pub mod vote;

pub use vote::{VoteEngine, VoteError, VoteStage};
