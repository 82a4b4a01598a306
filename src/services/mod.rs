pub mod poll_service;
pub mod status;
pub mod tally;
pub mod validator;
