//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Tab index out of range: {0}")]
    TabOutOfRange(usize),

    #[error("A close prompt is already pending")]
    PromptPending,

    #[error("No close prompt is pending")]
    NoPendingPrompt,

    #[error("Tab error: {0}")]
    Tab(#[from] shroud_tabs::TabError),

    #[error("Server error: {0}")]
    Server(#[from] shroud_server::ServerError),

    #[error("Settings error: {0}")]
    Settings(#[from] shroud_settings::SettingsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
