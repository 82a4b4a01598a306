use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::poll::{OptionId, PollId, PollStatus};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollResultsDTO {
    pub poll_id: PollId,
    pub question: String,
    pub status: PollStatus,
    pub is_closed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub total_votes: u64,
    pub options: Vec<PollOptionResultDTO>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionResultDTO {
    pub option_id: OptionId,
    pub option_text: String,
    pub votes: u32,
    pub percentage: u8,
}
