use std::future::Future;

use crate::{
    error::AppError,
    models::{
        poll::{NewPoll, OptionId, Poll, PollId, PollOption},
        vote::{UserId, Vote, VoteOutcome},
    },
};

/// True iff `votes` holds a vote by `user_id` on `poll_id`, whatever option
/// it picked.
pub fn has_user_voted(votes: &[Vote], user_id: UserId, poll_id: PollId) -> bool {
    votes
        .iter()
        .any(|vote| vote.user_id == user_id && vote.poll_id == poll_id)
}

/// Storage for polls and their options.
pub trait PollStore: Send + Sync {
    fn insert_poll(&self, poll: NewPoll) -> impl Future<Output = Result<Poll, AppError>> + Send;

    fn get_poll(
        &self,
        poll_id: PollId,
    ) -> impl Future<Output = Result<Option<Poll>, AppError>> + Send;

    fn get_options(
        &self,
        poll_id: PollId,
    ) -> impl Future<Output = Result<Vec<PollOption>, AppError>> + Send;

    fn list_polls(&self) -> impl Future<Output = Result<Vec<Poll>, AppError>> + Send;

    /// Marks the poll closed and returns it.
    fn close_poll(&self, poll_id: PollId) -> impl Future<Output = Result<Poll, AppError>> + Send;
}

/// Records votes, at most one per `(user_id, poll_id)`.
///
/// Implementations make the duplicate check, the vote insert and the option's
/// `vote_count` increment one atomic unit: of any number of concurrent calls
/// for the same user and poll exactly one returns `Accepted`.
///
/// `record_vote` answers in this order: `PollNotFound`, then `AlreadyVoted`
/// for a user who already has a vote on the poll (whatever option they send
/// now), then `PollClosed` for a poll whose status is closed, then
/// `InvalidPollOption`. The closed check is part of the atomic unit, so a vote
/// racing `close_poll` is either counted before the close or refused. Expiry by
/// end date needs a clock and is left to the caller.
pub trait VoteLedger: Send + Sync {
    fn record_vote(
        &self,
        user_id: UserId,
        poll_id: PollId,
        option_id: OptionId,
    ) -> impl Future<Output = Result<VoteOutcome, AppError>> + Send;

    fn votes_for_poll(
        &self,
        poll_id: PollId,
    ) -> impl Future<Output = Result<Vec<Vote>, AppError>> + Send;
}
