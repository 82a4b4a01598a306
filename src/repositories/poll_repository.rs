use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson},
    error::{
        Error as DbError, ErrorKind, WriteFailure, TRANSIENT_TRANSACTION_ERROR,
        UNKNOWN_TRANSACTION_COMMIT_RESULT,
    },
    options::{IndexOptions, ReturnDocument},
    Client, ClientSession, Collection, IndexModel,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::{
    error::{AppError, PollsError},
    models::{
        poll::{NewPoll, OptionId, Poll, PollId, PollOption, PollStatus},
        vote::{UserId, Vote, VoteOutcome},
    },
};

use super::vote_ledger::{PollStore, VoteLedger};

const POLLS: &str = "polls";
const VOTES: &str = "votes";
const COUNTERS: &str = "counters";

const DUPLICATE_KEY: i32 = 11000;
const MAX_ATTEMPTS: u32 = 10;
const BASE_DELAY_MS: u64 = 5;
const MAX_DELAY_MS: u64 = 200;

/// How one vote transaction ended when the server had no complaint.
#[derive(Debug)]
enum Attempt {
    Recorded(VoteOutcome),
    Rejected(PollsError),
}

/// A poll with its options embedded, as stored in the `polls` collection.
#[derive(Debug, Serialize, Deserialize)]
struct PollDocument {
    id: PollId,
    question: String,
    status: PollStatus,
    #[serde(default, with = "crate::models::poll::end_date_format")]
    end_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    options: Vec<PollOption>,
}

impl From<&PollDocument> for Poll {
    fn from(doc: &PollDocument) -> Self {
        Poll {
            id: doc.id,
            question: doc.question.clone(),
            status: doc.status,
            end_date: doc.end_date,
            created_at: doc.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Counter {
    #[serde(rename = "_id")]
    id: String,
    next: i64,
}

/// MongoDB storage. Votes live in their own collection under a unique
/// `(user_id, poll_id)` index; the option counts are embedded in the poll.
#[derive(Clone)]
pub struct PollRepository {
    client: Client,
    polls: Collection<PollDocument>,
    votes: Collection<Vote>,
    counters: Collection<Counter>,
}

impl PollRepository {
    pub fn new(client: Client, db_name: &str) -> Self {
        let db = client.database(db_name);
        Self {
            polls: db.collection::<PollDocument>(POLLS),
            votes: db.collection::<Vote>(VOTES),
            counters: db.collection::<Counter>(COUNTERS),
            client,
        }
    }

    /// Creates the unique indexes the ledger relies on. Idempotent.
    pub async fn ensure_indexes(&self) -> Result<(), AppError> {
        debug!("Ensuring collection indexes exist");
        let unique = IndexOptions::builder().unique(true).build();

        let poll_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(unique.clone())
            .build();
        self.polls.create_index(poll_index).await?;

        let vote_index = IndexModel::builder()
            .keys(doc! { "user_id": 1, "poll_id": 1 })
            .options(unique)
            .build();
        self.votes.create_index(vote_index).await?;

        Ok(())
    }

    async fn next_poll_id(&self) -> Result<PollId, AppError> {
        let counter = self
            .counters
            .find_one_and_update(doc! { "_id": POLLS }, doc! { "$inc": { "next": 1 } })
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::DatabaseError("Poll id counter missing".to_string()))?;
        Ok(counter.next)
    }

    async fn find_poll(&self, poll_id: PollId) -> Result<Option<PollDocument>, AppError> {
        Ok(self.polls.find_one(doc! { "id": poll_id }).await?)
    }

    /// Runs one vote inside `session`'s transaction. The caller commits or
    /// aborts.
    ///
    /// The insert goes first so the unique index answers duplicates before
    /// anything about the option is looked at. The poll is then read inside
    /// the transaction; a concurrent close touches the same document as the
    /// `$inc` and surfaces as a write conflict.
    async fn insert_vote(
        &self,
        session: &mut ClientSession,
        vote: &Vote,
    ) -> Result<Attempt, DbError> {
        if let Err(err) = self.votes.insert_one(vote).session(&mut *session).await {
            if is_duplicate_key_error(&err) {
                return Ok(Attempt::Recorded(VoteOutcome::AlreadyVoted));
            }
            return Err(err);
        }

        let Some(poll) = self
            .polls
            .find_one(doc! { "id": vote.poll_id })
            .session(&mut *session)
            .await?
        else {
            return Ok(Attempt::Rejected(PollsError::PollNotFound));
        };
        if poll.status == PollStatus::Closed {
            return Ok(Attempt::Rejected(PollsError::PollClosed));
        }

        let result = self
            .polls
            .update_one(
                doc! { "id": vote.poll_id, "options.id": vote.option_id },
                doc! { "$inc": { "options.$.vote_count": 1 } },
            )
            .session(&mut *session)
            .await?;
        if result.matched_count == 0 {
            return Ok(Attempt::Rejected(PollsError::InvalidPollOption));
        }

        Ok(Attempt::Recorded(VoteOutcome::Accepted))
    }

    async fn try_record_vote(&self, vote: &Vote) -> Result<Attempt, DbError> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        match self.insert_vote(&mut session, vote).await {
            Ok(Attempt::Recorded(VoteOutcome::Accepted)) => {
                commit_with_retry(&mut session).await?;
                Ok(Attempt::Recorded(VoteOutcome::Accepted))
            }
            other => {
                // The server may already have aborted on a duplicate key.
                let _ = session.abort_transaction().await;
                other
            }
        }
    }
}

/// Commits, retrying while the server can't say whether the commit landed.
/// Retrying a commit that did land is a no-op.
async fn commit_with_retry(session: &mut ClientSession) -> Result<(), DbError> {
    let mut attempt = 1;
    loop {
        match session.commit_transaction().await {
            Ok(()) => return Ok(()),
            Err(e) if e.contains_label(UNKNOWN_TRANSACTION_COMMIT_RESULT) && attempt < MAX_ATTEMPTS => {
                warn!("Retrying commit after unknown result: {}", e);
                tokio::time::sleep(retry_delay(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Jittered exponential backoff: at least half of `BASE_DELAY_MS * 2^(attempt - 1)`,
/// at most the whole, never above `MAX_DELAY_MS`.
pub(crate) fn retry_delay(attempt: u32) -> Duration {
    let ceiling = BASE_DELAY_MS
        .saturating_mul(2_u64.saturating_pow(attempt.saturating_sub(1)))
        .min(MAX_DELAY_MS);
    let floor = ceiling - ceiling / 2;
    let jitter = rand::thread_rng().gen_range(0..=ceiling / 2);
    Duration::from_millis(floor + jitter)
}

fn is_duplicate_key_error(err: &DbError) -> bool {
    match *err.kind {
        ErrorKind::Write(WriteFailure::WriteError(ref e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(ref e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

impl PollStore for PollRepository {
    async fn insert_poll(&self, new_poll: NewPoll) -> Result<Poll, AppError> {
        let poll_id = self.next_poll_id().await?;
        let document = PollDocument {
            id: poll_id,
            question: new_poll.question,
            status: PollStatus::Active,
            end_date: new_poll.end_date,
            created_at: Utc::now(),
            options: new_poll
                .options
                .into_iter()
                .zip(1..)
                .map(|(option_text, id)| PollOption {
                    id,
                    poll_id,
                    option_text,
                    vote_count: 0,
                })
                .collect(),
        };

        self.polls.insert_one(&document).await?;
        info!("Created poll {}", poll_id);
        Ok(Poll::from(&document))
    }

    async fn get_poll(&self, poll_id: PollId) -> Result<Option<Poll>, AppError> {
        Ok(self.find_poll(poll_id).await?.as_ref().map(Poll::from))
    }

    async fn get_options(&self, poll_id: PollId) -> Result<Vec<PollOption>, AppError> {
        self.find_poll(poll_id)
            .await?
            .map(|doc| doc.options)
            .ok_or(AppError::Poll(PollsError::PollNotFound))
    }

    async fn list_polls(&self) -> Result<Vec<Poll>, AppError> {
        let documents: Vec<PollDocument> = self
            .polls
            .find(doc! {})
            .sort(doc! { "id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(documents.iter().map(Poll::from).collect())
    }

    async fn close_poll(&self, poll_id: PollId) -> Result<Poll, AppError> {
        let closed =
            to_bson(&PollStatus::Closed).map_err(|e| AppError::DatabaseError(e.to_string()))?;
        let document = self
            .polls
            .find_one_and_update(doc! { "id": poll_id }, doc! { "$set": { "status": closed } })
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(AppError::Poll(PollsError::PollNotFound))?;
        info!("Closed poll {}", poll_id);
        Ok(Poll::from(&document))
    }
}

impl VoteLedger for PollRepository {
    async fn record_vote(
        &self,
        user_id: UserId,
        poll_id: PollId,
        option_id: OptionId,
    ) -> Result<VoteOutcome, AppError> {
        let vote = Vote {
            user_id,
            poll_id,
            option_id,
        };
        let mut attempt = 1;
        loop {
            match self.try_record_vote(&vote).await {
                Ok(Attempt::Recorded(outcome)) => {
                    debug!(
                        "Vote by user {} on poll {} for option {}: {:?}",
                        user_id, poll_id, option_id, outcome
                    );
                    return Ok(outcome);
                }
                Ok(Attempt::Rejected(reason)) => {
                    debug!(
                        "Vote by user {} on poll {} for option {} rejected: {}",
                        user_id, poll_id, option_id, reason
                    );
                    return Err(reason.into());
                }
                // Concurrent votes on one poll collide as write conflicts on
                // the poll document. Backing off lets them drain in turn.
                Err(e) if e.contains_label(TRANSIENT_TRANSACTION_ERROR) && attempt < MAX_ATTEMPTS => {
                    let delay = retry_delay(attempt);
                    warn!(
                        "Retrying vote on poll {} in {:?} after transient error (attempt {}): {}",
                        poll_id, delay, attempt, e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Vote transaction on poll {} failed: {}", poll_id, e);
                    return Err(e.into());
                }
            }
        }
    }

    async fn votes_for_poll(&self, poll_id: PollId) -> Result<Vec<Vote>, AppError> {
        let votes = self
            .votes
            .find(doc! { "poll_id": poll_id })
            .await?
            .try_collect()
            .await?;
        Ok(votes)
    }
}
