use chrono::DateTime;
use chrono_tz::Tz;

use crate::{models::poll::parse_end_date, utils::clock::Clock};

pub const QUESTION_REQUIRED: &str = "Question is required";
pub const OPTIONS_REQUIRED: &str = "Poll options are required";
pub const TOO_FEW_OPTIONS: &str = "At least 2 poll options are required";
pub const INVALID_END_DATE: &str = "End date must be a valid future date";

/// Checks a proposed poll against the current UTC time.
pub fn validate_poll<S: AsRef<str>>(
    question: &str,
    options: &[S],
    end_date: Option<&str>,
) -> Vec<String> {
    validate_poll_at(question, options, end_date, Clock::utc().now())
}

/// Checks a proposed poll, reporting every rule it breaks.
///
/// The end date is read as wall time in `now`'s timezone. An unparseable
/// end date and one that is not after `now` get the same message.
pub fn validate_poll_at<S: AsRef<str>>(
    question: &str,
    options: &[S],
    end_date: Option<&str>,
    now: DateTime<Tz>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if question.trim().is_empty() {
        errors.push(QUESTION_REQUIRED.to_string());
    }

    if options.is_empty() {
        errors.push(OPTIONS_REQUIRED.to_string());
    } else if normalize_options(options).len() < 2 {
        errors.push(TOO_FEW_OPTIONS.to_string());
    }

    if let Some(raw) = end_date.filter(|raw| !raw.trim().is_empty()) {
        match parse_end_date(raw, now.timezone()) {
            Some(end) if end > now.naive_local() => {}
            _ => errors.push(INVALID_END_DATE.to_string()),
        }
    }

    errors
}

/// Trims every option and drops the blank ones.
pub fn normalize_options<S: AsRef<str>>(options: &[S]) -> Vec<String> {
    options
        .iter()
        .map(|option| option.as_ref().trim())
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect()
}
