use chrono::NaiveDate;

use crate::{
    models::poll::{Poll, PollStatus},
    utils::clock::Clock,
};

pub fn is_closed(poll: &Poll) -> bool {
    is_closed_on(poll, Clock::utc().today())
}

pub fn is_active(poll: &Poll) -> bool {
    !is_closed(poll)
}

/// A poll is closed when marked closed, or when its end date is before
/// `today`. Only calendar dates are compared.
pub fn is_closed_on(poll: &Poll, today: NaiveDate) -> bool {
    poll.status == PollStatus::Closed || poll.end_date.is_some_and(|end| end < today)
}

pub fn is_active_on(poll: &Poll, today: NaiveDate) -> bool {
    !is_closed_on(poll, today)
}
