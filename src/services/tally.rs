use crate::models::poll::{OptionId, PollOption};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTally {
    pub option_id: OptionId,
    pub option_text: String,
    pub votes: u32,
    pub percentage: u8,
}

pub fn get_total_votes(options: &[PollOption]) -> u64 {
    options.iter().map(|option| u64::from(option.vote_count)).sum()
}

/// `count` as a whole percentage of `total`, rounded half away from zero.
/// Zero when nobody has voted yet.
pub fn calculate_percentage(count: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let (count, total) = (u128::from(count), u128::from(total));
    // round(100c/t) == floor((200c + t) / 2t) for non-negative integers
    let rounded = (200 * count + total) / (2 * total);
    rounded.min(100) as u8
}

/// Per-option rows for a results view. Each percentage is rounded on its own,
/// so the column does not always add up to 100.
pub fn tally(options: &[PollOption]) -> Vec<OptionTally> {
    let total = get_total_votes(options);
    options
        .iter()
        .map(|option| OptionTally {
            option_id: option.id,
            option_text: option.option_text.clone(),
            votes: option.vote_count,
            percentage: calculate_percentage(u64::from(option.vote_count), total),
        })
        .collect()
}
