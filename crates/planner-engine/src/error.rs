//! Error types for planner-engine operations.
//!
//! The query functions themselves are total; errors only arise at the edges
//! where configuration or event records are built from untrusted input.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlannerError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
