use std::sync::Arc;

use tracing::warn;

use crate::{
    dtos::{
        requests::CreatePollDTO,
        responses::{PollOptionResultDTO, PollResultsDTO},
    },
    error::{AppError, PollsError},
    models::{
        poll::{parse_end_date, NewPoll, OptionId, Poll, PollId},
        vote::{UserId, VoteOutcome},
    },
    repositories::vote_ledger::{has_user_voted, PollStore, VoteLedger},
    utils::clock::Clock,
};

use super::{
    status::is_closed_on,
    tally::{get_total_votes, tally},
    validator::{normalize_options, validate_poll_at},
};

/// Entry point for the web layer: poll creation, voting and results on top
/// of any store that also keeps the vote ledger.
pub struct PollService<S> {
    store: Arc<S>,
    clock: Clock,
}

impl<S> Clone for PollService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: self.clock,
        }
    }
}

impl<S: PollStore + VoteLedger> PollService<S> {
    pub fn new(store: Arc<S>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub async fn create_poll(&self, payload: CreatePollDTO) -> Result<Poll, AppError> {
        let end_date = payload.end_date.as_deref();
        let errors = validate_poll_at(
            &payload.question,
            payload.options.as_slice(),
            end_date,
            self.clock.now(),
        );
        if !errors.is_empty() {
            warn!("Rejected poll definition: {}", errors.join(", "));
            return Err(AppError::Poll(PollsError::Validation(errors)));
        }

        let new_poll = NewPoll {
            question: payload.question.trim().to_string(),
            options: normalize_options(payload.options.as_slice()),
            end_date: end_date
                .and_then(|raw| parse_end_date(raw, self.clock.timezone()))
                .map(|end| end.date()),
        };
        self.store.insert_poll(new_poll).await
    }

    pub async fn get_poll(&self, poll_id: PollId) -> Result<Poll, AppError> {
        self.store
            .get_poll(poll_id)
            .await?
            .ok_or(AppError::Poll(PollsError::PollNotFound))
    }

    pub async fn list_polls(&self) -> Result<Vec<Poll>, AppError> {
        self.store.list_polls().await
    }

    pub fn is_closed(&self, poll: &Poll) -> bool {
        is_closed_on(poll, self.clock.today())
    }

    pub fn is_active(&self, poll: &Poll) -> bool {
        !self.is_closed(poll)
    }

    pub async fn has_user_voted(
        &self,
        user_id: UserId,
        poll_id: PollId,
    ) -> Result<bool, AppError> {
        let votes = self.store.votes_for_poll(poll_id).await?;
        Ok(has_user_voted(&votes, user_id, poll_id))
    }

    /// Whether the voting form should be offered to `user_id`.
    pub async fn can_vote(&self, user_id: UserId, poll_id: PollId) -> Result<bool, AppError> {
        let poll = self.get_poll(poll_id).await?;
        if self.is_closed(&poll) {
            return Ok(false);
        }
        Ok(!self.has_user_voted(user_id, poll_id).await?)
    }

    /// Polls that are closed or past their end date are refused before the
    /// ledger is touched. The ledger checks the closed status again under its
    /// own lock, which covers a `close_poll` landing in between.
    pub async fn cast_vote(
        &self,
        user_id: UserId,
        poll_id: PollId,
        option_id: OptionId,
    ) -> Result<VoteOutcome, AppError> {
        let poll = self.get_poll(poll_id).await?;
        if self.is_closed(&poll) {
            warn!("User {} tried to vote on closed poll {}", user_id, poll_id);
            return Err(AppError::Poll(PollsError::PollClosed));
        }
        self.store.record_vote(user_id, poll_id, option_id).await
    }

    pub async fn close_poll(&self, poll_id: PollId) -> Result<Poll, AppError> {
        self.store.close_poll(poll_id).await
    }

    pub async fn get_poll_results(&self, poll_id: PollId) -> Result<PollResultsDTO, AppError> {
        let poll = self.get_poll(poll_id).await?;
        let options = self.store.get_options(poll_id).await?;

        Ok(PollResultsDTO {
            poll_id: poll.id,
            is_closed: self.is_closed(&poll),
            question: poll.question,
            status: poll.status,
            end_date: poll.end_date,
            total_votes: get_total_votes(&options),
            options: tally(&options)
                .into_iter()
                .map(|row| PollOptionResultDTO {
                    option_id: row.option_id,
                    option_text: row.option_text,
                    votes: row.votes,
                    percentage: row.percentage,
                })
                .collect(),
        })
    }
}
