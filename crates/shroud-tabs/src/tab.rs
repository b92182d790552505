//! Session tab
//!
//! The close flow is its own small state machine:
//! ```text
//! Idle
//!   ↓ request_close (server active or settings persistent)
//! PendingConfirmation
//!   ↓ cancel_close          ↓ teardown
//! Idle                    closed (removed by the registry)
//! ```
//! A tab whose server is stopped and whose settings are not persistent
//! skips the pending state entirely.

use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

use shroud_server::{LaunchOutcome, ServerBackend, ServerState, ServerStatus};
use shroud_settings::{ModeOptions, SessionSettings, SettingsError};

use crate::error::TabError;
use crate::mode::Mode;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseState {
    Idle,
    PendingConfirmation,
}

/// What a close request requires next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseIntent {
    /// Nothing to protect; the tab can be torn down immediately
    ReadyToClose,
    /// A confirmation prompt must resolve before any teardown
    ConfirmationRequired,
    /// A prompt is already outstanding for this tab; the request coalesces
    AlreadyPending,
}

#[derive(Debug)]
pub struct Tab {
    /// Unique identifier, shared with the settings file stem
    pub id: String,
    mode: Mode,
    status: Option<ServerStatus>,
    settings: SessionSettings,
    close_state: CloseState,
    /// When the tab was opened
    pub created_at: DateTime<Utc>,
}

impl Tab {
    /// Open a fresh placeholder tab.
    pub fn new(data_dir: PathBuf) -> Self {
        let settings = SessionSettings::new(data_dir);
        Self {
            id: settings.id.clone(),
            mode: Mode::NewTab,
            status: None,
            settings,
            close_state: CloseState::Idle,
            created_at: Utc::now(),
        }
    }

    /// Reopen a tab from settings persisted by a previous run. The mode is
    /// recovered from the payload tag; the server starts out stopped.
    pub fn from_settings(
        settings: SessionSettings,
        backend: Arc<dyn ServerBackend>,
    ) -> Result<Self> {
        let mode = match settings.options() {
            Some(options) => Mode::of(options),
            None => return Err(TabError::Settings(SettingsError::NoModeSelected)),
        };

        let status = ServerStatus::new(settings.id.clone(), backend);
        tracing::info!(tab_id = %settings.id, %mode, "Restored persistent tab");

        Ok(Self {
            id: settings.id.clone(),
            mode,
            status: Some(status),
            settings,
            close_state: CloseState::Idle,
            created_at: Utc::now(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_placeholder(&self) -> bool {
        self.mode.is_placeholder()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn server_state(&self) -> Option<ServerState> {
        self.status.as_ref().map(ServerStatus::state)
    }

    pub fn is_server_active(&self) -> bool {
        self.status.as_ref().map(ServerStatus::is_active).unwrap_or(false)
    }

    /// Leave the placeholder state. Irreversible; the mode is the payload's
    /// tag, and the tab gains its server status here.
    pub fn select_mode(
        &mut self,
        options: ModeOptions,
        backend: Arc<dyn ServerBackend>,
    ) -> Result<Mode> {
        self.ensure_not_closing()?;
        if self.mode != Mode::NewTab {
            return Err(TabError::ModeAlreadySelected { current: self.mode });
        }

        let mode = Mode::of(&options);
        self.status = Some(ServerStatus::new(self.id.clone(), backend));
        self.settings.set_options(options)?;
        self.mode = mode;

        tracing::info!(tab_id = %self.id, %mode, "Selected tab mode");
        Ok(mode)
    }

    pub fn add_file(&mut self, path: PathBuf) -> Result<()> {
        self.ensure_not_closing()?;
        self.settings.add_file(path)?;
        Ok(())
    }

    pub fn set_persistent(&mut self, persistent: bool) -> Result<()> {
        self.ensure_not_closing()?;
        if persistent {
            self.settings.enable_persistence()?;
        } else {
            self.settings.disable_persistence()?;
        }
        Ok(())
    }

    pub fn start_server(&mut self) -> Result<()> {
        self.ensure_not_closing()?;
        let status = self.status.as_mut().ok_or(TabError::NoServer)?;
        status.start()?;
        Ok(())
    }

    pub fn stop_server(&mut self) -> Result<()> {
        self.ensure_not_closing()?;
        let status = self.status.as_mut().ok_or(TabError::NoServer)?;
        status.stop()?;
        Ok(())
    }

    /// Entry point for the backend's asynchronous launch completion. Not
    /// gated on the close flow: a completion is a backend signal, not a
    /// user intent, and may arrive while a prompt is pending.
    pub fn handle_launch_outcome(&mut self, outcome: LaunchOutcome) -> Result<ServerState> {
        let status = self.status.as_mut().ok_or(TabError::NoServer)?;
        Ok(status.handle_launch_outcome(outcome)?)
    }

    pub fn is_close_pending(&self) -> bool {
        self.close_state == CloseState::PendingConfirmation
    }

    /// An active server and persistent settings each warrant a prompt; a
    /// single prompt covers both.
    pub fn needs_close_confirmation(&self) -> bool {
        self.is_server_active() || self.settings.is_persistent()
    }

    /// Evaluate a close request. Nothing is torn down here; teardown only
    /// happens immediately when no confirmation is needed, or after the
    /// prompt is accepted.
    pub fn request_close(&mut self) -> CloseIntent {
        if self.close_state == CloseState::PendingConfirmation {
            return CloseIntent::AlreadyPending;
        }
        if self.needs_close_confirmation() {
            self.close_state = CloseState::PendingConfirmation;
            tracing::debug!(tab_id = %self.id, "Close requires confirmation");
            CloseIntent::ConfirmationRequired
        } else {
            CloseIntent::ReadyToClose
        }
    }

    /// Reject a pending close; the tab is exactly as it was before the
    /// request.
    pub fn cancel_close(&mut self) {
        self.close_state = CloseState::Idle;
    }

    /// Confirmed-close teardown. The server is stopped (and visible as
    /// stopped) before the settings file is removed; persistence is revoked
    /// even if it was enabled.
    pub fn teardown(&mut self) -> Result<()> {
        self.close_state = CloseState::Idle;
        if let Some(status) = self.status.as_mut() {
            status.stop()?;
        }
        self.settings.delete()?;
        tracing::info!(tab_id = %self.id, "Tore down tab");
        Ok(())
    }

    fn ensure_not_closing(&self) -> Result<()> {
        if self.close_state == CloseState::PendingConfirmation {
            return Err(TabError::ClosePending);
        }
        Ok(())
    }
}
