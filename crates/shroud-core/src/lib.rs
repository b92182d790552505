//! Shroud Core
//!
//! Central coordination layer: the tab registry, the close-confirmation
//! coordinator, and the event-driven facade the GUI shell talks to. Tab
//! state is serialized behind the registry lock; close paths additionally
//! hold the coordinator lock so prompts and tab close state move together.

mod app;
mod config;
mod coordinator;
mod error;
mod events;
mod registry;

pub use app::App;
pub use config::Config;
pub use coordinator::{CloseCoordinator, CloseDecision, CloseTarget};
pub use error::CoreError;
pub use events::{Notification, UiEvent};
pub use registry::{CloseOutcome, QuitOutcome, TabRegistry};

// Re-export core components
pub use shroud_server::{LaunchOutcome, ServerBackend, ServerError, ServerState, ServerStatus};
pub use shroud_settings::{ModeOptions, SessionSettings, SettingsError};
pub use shroud_tabs::{CloseIntent, Mode, Tab, TabError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
