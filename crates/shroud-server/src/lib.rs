//! Shroud Server Lifecycle
//!
//! Tracks one session's server through its start/stop lifecycle. The actual
//! network side (listening socket, transfer protocol, anonymizing transport)
//! is an external collaborator behind the [`ServerBackend`] trait.

mod backend;
mod error;
mod status;

pub use backend::ServerBackend;
pub use error::ServerError;
pub use status::{LaunchOutcome, ServerState, ServerStatus};

pub type Result<T> = std::result::Result<T, ServerError>;
