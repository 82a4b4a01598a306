use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{
    error::{AppError, PollsError},
    models::{
        poll::{NewPoll, OptionId, Poll, PollId, PollOption, PollStatus},
        vote::{UserId, Vote, VoteOutcome},
    },
};

use super::vote_ledger::{has_user_voted, PollStore, VoteLedger};

struct PollEntry {
    poll: Poll,
    options: Vec<PollOption>,
    votes: Vec<Vote>,
}

/// Process-local store. Each poll sits behind its own lock, so votes on one
/// poll serialize while different polls don't contend.
#[derive(Default)]
pub struct InMemoryPollRepository {
    polls: RwLock<HashMap<PollId, Arc<Mutex<PollEntry>>>>,
    next_id: AtomicI64,
}

impl InMemoryPollRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a poll as the persistence layer already holds it, options and
    /// votes included. Replaces any poll with the same id.
    pub async fn seed(&self, poll: Poll, options: Vec<PollOption>, votes: Vec<Vote>) {
        self.next_id.fetch_max(poll.id, Ordering::SeqCst);
        let entry = PollEntry {
            poll,
            options,
            votes,
        };
        self.polls
            .write()
            .await
            .insert(entry.poll.id, Arc::new(Mutex::new(entry)));
    }

    async fn entry(&self, poll_id: PollId) -> Option<Arc<Mutex<PollEntry>>> {
        self.polls.read().await.get(&poll_id).cloned()
    }
}

impl PollStore for InMemoryPollRepository {
    async fn insert_poll(&self, new_poll: NewPoll) -> Result<Poll, AppError> {
        let poll_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let poll = Poll {
            id: poll_id,
            question: new_poll.question,
            status: PollStatus::Active,
            end_date: new_poll.end_date,
            created_at: Utc::now(),
        };
        let options = new_poll
            .options
            .into_iter()
            .zip(1..)
            .map(|(option_text, id)| PollOption {
                id,
                poll_id,
                option_text,
                vote_count: 0,
            })
            .collect();

        self.seed(poll.clone(), options, Vec::new()).await;
        info!("Created poll {}", poll_id);
        Ok(poll)
    }

    async fn get_poll(&self, poll_id: PollId) -> Result<Option<Poll>, AppError> {
        let Some(entry) = self.entry(poll_id).await else {
            return Ok(None);
        };
        let poll = entry.lock().await.poll.clone();
        Ok(Some(poll))
    }

    async fn get_options(&self, poll_id: PollId) -> Result<Vec<PollOption>, AppError> {
        let entry = self
            .entry(poll_id)
            .await
            .ok_or(AppError::Poll(PollsError::PollNotFound))?;
        let options = entry.lock().await.options.clone();
        Ok(options)
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, AppError> {
        let entries: Vec<_> = self.polls.read().await.values().cloned().collect();
        let mut polls = Vec::with_capacity(entries.len());
        for entry in entries {
            polls.push(entry.lock().await.poll.clone());
        }
        polls.sort_by_key(|poll| poll.id);
        Ok(polls)
    }

    async fn close_poll(&self, poll_id: PollId) -> Result<Poll, AppError> {
        let entry = self
            .entry(poll_id)
            .await
            .ok_or(AppError::Poll(PollsError::PollNotFound))?;
        let mut entry = entry.lock().await;
        entry.poll.status = PollStatus::Closed;
        info!("Closed poll {}", poll_id);
        Ok(entry.poll.clone())
    }
}

impl VoteLedger for InMemoryPollRepository {
    async fn record_vote(
        &self,
        user_id: UserId,
        poll_id: PollId,
        option_id: OptionId,
    ) -> Result<VoteOutcome, AppError> {
        let entry = self
            .entry(poll_id)
            .await
            .ok_or(AppError::Poll(PollsError::PollNotFound))?;
        // Held across the check, the insert and the increment.
        let mut entry = entry.lock().await;

        if has_user_voted(&entry.votes, user_id, poll_id) {
            debug!("User {} already voted on poll {}", user_id, poll_id);
            return Ok(VoteOutcome::AlreadyVoted);
        }
        if entry.poll.status == PollStatus::Closed {
            debug!("User {} voted on closed poll {}", user_id, poll_id);
            return Err(AppError::Poll(PollsError::PollClosed));
        }

        let option = entry
            .options
            .iter_mut()
            .find(|option| option.id == option_id)
            .ok_or(AppError::Poll(PollsError::InvalidPollOption))?;
        option.vote_count += 1;
        entry.votes.push(Vote {
            user_id,
            poll_id,
            option_id,
        });

        debug!(
            "Recorded vote by user {} on poll {} for option {}",
            user_id, poll_id, option_id
        );
        Ok(VoteOutcome::Accepted)
    }

    async fn votes_for_poll(&self, poll_id: PollId) -> Result<Vec<Vote>, AppError> {
        let Some(entry) = self.entry(poll_id).await else {
            return Ok(Vec::new());
        };
        let votes = entry.lock().await.votes.clone();
        Ok(votes)
    }
}
