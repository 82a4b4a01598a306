pub mod memory_repository;
pub mod poll_repository;
pub mod vote_ledger;
