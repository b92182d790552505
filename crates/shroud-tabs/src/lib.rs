//! Shroud Session Tabs
//!
//! A tab is one independent unit of sharing activity: a mode, a server
//! status, and its settings. Tabs guard against silent loss of an active or
//! persistent session through the close-intent state machine.

mod error;
mod mode;
mod tab;

pub use error::TabError;
pub use mode::Mode;
pub use tab::{CloseIntent, CloseState, Tab};

pub type Result<T> = std::result::Result<T, TabError>;
