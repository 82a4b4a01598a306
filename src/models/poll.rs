use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub type PollId = i64;
pub type OptionId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    /// Being prepared, reported to callers as active.
    Draft,
    Active,
    /// Closed by hand. Stays closed whatever the end date says.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub status: PollStatus,
    /// `None` for an open-ended poll.
    #[serde(default, with = "end_date_format")]
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: OptionId,
    /// References Poll.id
    pub poll_id: PollId,
    pub option_text: String,
    pub vote_count: u32,
}

/// A validated poll ready to be stored.
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub question: String,
    pub options: Vec<String>,
    pub end_date: Option<NaiveDate>,
}

const DATE_TIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

/// Parses an end date as typed into a form or sent by an API client, as wall
/// time in `tz`. Date-only input means the start of that day; timestamps with
/// an offset are converted into `tz`.
pub fn parse_end_date(raw: &str, tz: Tz) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&tz).naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// `null`, a missing field and `""` all mean open-ended. Stored values that
/// don't parse are treated as open-ended too, since they can't expire.
/// Stored timestamps with an offset are dated in UTC.
pub(crate) mod end_date_format {
    use super::*;
    use serde::{Deserializer, Serializer};
    use tracing::warn;

    pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => serializer.serialize_some(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|raw| {
            if raw.trim().is_empty() {
                return None;
            }
            let parsed = parse_end_date(&raw, Tz::UTC).map(|dt| dt.date());
            if parsed.is_none() {
                warn!("Ignoring unparseable poll end_date {:?}", raw);
            }
            parsed
        }))
    }
}
