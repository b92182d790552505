//! Server error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Server failed to start: {0}")]
    StartFailure(String),

    #[error("Server backend error: {0}")]
    Backend(String),
}
