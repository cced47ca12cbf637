use thiserror::Error;

use crate::model::Minutes;

#[derive(Error, Debug)]
pub enum BalancerError {
    #[error("Max time must be greater than zero, got {0}")]
    InvalidMaxTime(Minutes),

    #[error("Max iterations must be greater than zero")]
    InvalidIterations,

    #[error("Duplicate station id: {0}")]
    DuplicateStation(String),

    #[error("Duplicate test id: {0}")]
    DuplicateTest(String),

    #[error("Test {test_id} is assigned to both {first} and {second}")]
    TestAssignedTwice {
        test_id: String,
        first: String,
        second: String,
    },

    #[error("Test {0} has a zero estimated duration")]
    ZeroDuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BalancerError>;
