//! Tab error types

use thiserror::Error;

use crate::mode::Mode;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("Tab already left the placeholder state (mode: {current})")]
    ModeAlreadySelected { current: Mode },

    #[error("Tab has no server (no mode selected)")]
    NoServer,

    #[error("Tab has a close confirmation pending")]
    ClosePending,

    #[error("Server error: {0}")]
    Server(#[from] shroud_server::ServerError),

    #[error("Settings error: {0}")]
    Settings(#[from] shroud_settings::SettingsError),
}
