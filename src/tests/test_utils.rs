use std::sync::{Arc, Once};

use chrono::{Duration, NaiveDate, Utc};

use crate::{
    config::logger::initialize_logger,
    models::poll::{OptionId, Poll, PollId, PollOption, PollStatus},
    repositories::memory_repository::InMemoryPollRepository,
    services::poll_service::PollService,
    utils::clock::Clock,
};

static LOGGER: Once = Once::new();

pub fn init_test_logger() {
    LOGGER.call_once(|| {
        let _ = initialize_logger();
    });
}

pub fn today() -> NaiveDate {
    Clock::utc().today()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn poll_with(id: PollId, status: PollStatus, end_date: Option<NaiveDate>) -> Poll {
    Poll {
        id,
        question: "What should be our next community event?".to_string(),
        status,
        end_date,
        created_at: Utc::now(),
    }
}

pub fn option(id: OptionId, poll_id: PollId, text: &str, vote_count: u32) -> PollOption {
    PollOption {
        id,
        poll_id,
        option_text: text.to_string(),
        vote_count,
    }
}

pub fn setup_test_service() -> PollService<InMemoryPollRepository> {
    init_test_logger();
    PollService::new(Arc::new(InMemoryPollRepository::new()), Clock::utc())
}

/// Seeds an open poll with zero-vote options numbered from 1.
pub async fn seed_open_poll(
    repository: &InMemoryPollRepository,
    poll_id: PollId,
    options: &[&str],
) -> Poll {
    let poll = poll_with(poll_id, PollStatus::Active, Some(days_from_today(7)));
    let options = options
        .iter()
        .zip(1..)
        .map(|(text, id)| option(id, poll_id, text, 0))
        .collect();
    repository.seed(poll.clone(), options, Vec::new()).await;
    poll
}
