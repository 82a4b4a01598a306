use serde::{Deserialize, Serialize};

use crate::error::PollsError;

use super::poll::{OptionId, PollId};

pub type UserId = i64;

/// One user's choice on one poll. `(user_id, poll_id)` is unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub user_id: UserId,
    pub poll_id: PollId,
    pub option_id: OptionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoteOutcome {
    Accepted,
    AlreadyVoted,
}

impl VoteOutcome {
    pub fn is_accepted(self) -> bool {
        self == VoteOutcome::Accepted
    }

    /// For callers that surface a duplicate vote as an error.
    pub fn ensure_accepted(self) -> Result<(), PollsError> {
        match self {
            VoteOutcome::Accepted => Ok(()),
            VoteOutcome::AlreadyVoted => Err(PollsError::AlreadyVoted),
        }
    }
}
