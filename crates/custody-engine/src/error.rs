//! Error types for custody-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CustodyError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}

pub type Result<T> = std::result::Result<T, CustodyError>;
