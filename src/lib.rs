//! Poll lifecycle and vote tallying for the community portal.
//!
//! The web layer hands in plain poll, option and vote records and gets back
//! validation messages, open/closed decisions, vote outcomes and tallies.

pub mod config;
pub mod dtos;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

pub use error::{AppError, PollsError};
pub use models::{
    poll::{OptionId, Poll, PollId, PollOption, PollStatus},
    vote::{UserId, Vote, VoteOutcome},
};
pub use repositories::vote_ledger::{has_user_voted, PollStore, VoteLedger};
pub use services::{
    poll_service::PollService,
    status::{is_active, is_closed},
    tally::{calculate_percentage, get_total_votes},
    validator::validate_poll,
};
