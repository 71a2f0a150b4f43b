//! Unified error types for the back office.
//!
//! Validation and lifecycle errors are raised before any state is touched, so a
//! caller that receives one of them can assume the registry is unchanged.

use crate::{models::PlanStatus, store::StoreError};
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Database layer failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input rejected before any mutation (missing field, same branch, bad qty, ...)
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description shown to the user
        message: String,
    },

    /// No transfer plan with this id
    #[error("Transfer plan not found: {id}")]
    PlanNotFound {
        /// Plan id that was looked up
        id: String,
    },

    /// The requested action is not allowed from the plan's current status
    #[error("Cannot {action} transfer plan {plan_number} while it is '{status}'")]
    InvalidTransition {
        /// Plan number (`RTR-...`)
        plan_number: String,
        /// Status at the time of the attempt
        status: PlanStatus,
        /// Action that was refused
        action: &'static str,
    },

    /// Conversion refused because the plan carries no line items
    #[error("Transfer plan {plan_number} has no line items to transfer")]
    EmptyLineItems {
        /// Plan number (`RTR-...`)
        plan_number: String,
    },

    /// Change-request (pengajuan) overlay misuse
    #[error("Change request on {plan_number}: {message}")]
    ChangeRequest {
        /// Plan number (`RTR-...`)
        plan_number: String,
        /// What went wrong
        message: String,
    },

    /// Key-value store failure that the caller chose to surface
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
