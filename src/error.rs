use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // Database Errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    // Configuration Errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Poll Errors
    #[error("Poll error: {0}")]
    Poll(#[from] PollsError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PollsError {
    #[error("Poll not found")]
    PollNotFound,

    #[error("Poll has been closed")]
    PollClosed,

    #[error("Invalid poll option")]
    InvalidPollOption,

    #[error("User has already voted on this poll")]
    AlreadyVoted,

    #[error("Invalid poll: {}", .0.join(", "))]
    Validation(Vec<String>),
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
