//! UI boundary types
//!
//! Intents arrive from the GUI shell; notifications flow back out. The core
//! never talks to widgets directly.

use std::path::PathBuf;

use shroud_server::ServerState;
use shroud_settings::ModeOptions;

use crate::coordinator::CloseTarget;

/// User intents delivered by the GUI.
#[derive(Debug, Clone)]
pub enum UiEvent {
    NewTab,
    SelectTab(usize),
    CloseTab(usize),
    /// The payload's tag names the chosen mode
    ModeSelected(usize, ModeOptions),
    AddFile(usize, PathBuf),
    StartServer(usize),
    StopServer(usize),
    EnablePersistence(usize),
    DisablePersistence(usize),
    /// Accept button of the pending close prompt
    AcceptClose,
    /// Reject button of the pending close prompt
    RejectClose,
    Quit,
}

/// State changes pushed back to the GUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    TabOpened(usize),
    TabClosed(usize),
    StatusChanged(usize, ServerState),
    /// A close prompt must be shown; resolves via AcceptClose/RejectClose
    ConfirmClose(CloseTarget),
    /// All servers are down; the shell may exit
    QuitReady,
    /// Non-fatal failure to surface to the user
    Error(String),
}
