//! Server Status State Machine
//!
//! ```text
//! Stopped
//!   ↓ start
//! Working
//!   ↓ launch ok        ↓ launch failed
//! Started            Stopped
//!   ↓ stop
//! Stopped
//! ```

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::ServerBackend;
use crate::error::ServerError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerState {
    /// No server resources are held
    Stopped,
    /// Launch requested, waiting for the backend to bind
    Working,
    /// Server is up and serving
    Started,
}

impl ServerState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: ServerState) -> bool {
        match (self, target) {
            // Stopped can only begin a launch
            (ServerState::Stopped, ServerState::Working) => true,
            // Working resolves to Started, or back to Stopped on failure/stop
            (ServerState::Working, ServerState::Started) => true,
            (ServerState::Working, ServerState::Stopped) => true,
            // Started can only be stopped
            (ServerState::Started, ServerState::Stopped) => true,
            // Same state is always valid (no-op)
            (a, b) if *a == b => true,
            _ => false,
        }
    }

    /// A half-started server still holds resources, so Working counts
    pub fn is_active(&self) -> bool {
        matches!(self, ServerState::Working | ServerState::Started)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ServerState::Stopped => "stopped",
            ServerState::Working => "working",
            ServerState::Started => "started",
        }
    }
}

impl std::fmt::Display for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ServerState {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "stopped" => Ok(ServerState::Stopped),
            "working" => Ok(ServerState::Working),
            "started" => Ok(ServerState::Started),
            _ => Err(format!("Unknown server state: {}", s)),
        }
    }
}

/// Outcome reported asynchronously by the external server after a launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchOutcome {
    Started,
    Failed(String),
}

/// One session's server status plus its handle into the external backend.
///
/// The owning session is the only writer of the state field; completion
/// signals arriving after a user-initiated stop are discarded as stale.
pub struct ServerStatus {
    session_id: String,
    state: ServerState,
    backend: Arc<dyn ServerBackend>,
}

impl ServerStatus {
    pub fn new(session_id: String, backend: Arc<dyn ServerBackend>) -> Self {
        Self {
            session_id,
            state: ServerState::Stopped,
            backend,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Begin a launch. Valid only from Stopped; moves to Working and invokes
    /// the backend. A synchronous launch error reverts to Stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.state != ServerState::Stopped {
            return Err(ServerError::InvalidTransition {
                from: self.state.to_string(),
                to: ServerState::Working.to_string(),
            });
        }

        self.state = ServerState::Working;
        tracing::debug!(session_id = %self.session_id, "Launching server");

        if let Err(e) = self.backend.launch(&self.session_id) {
            self.state = ServerState::Stopped;
            return Err(e);
        }

        Ok(())
    }

    /// Stop the server. Valid in any state; a stop on an already-stopped
    /// server is a no-op success.
    pub fn stop(&mut self) -> Result<()> {
        if self.state == ServerState::Stopped {
            return Ok(());
        }

        self.state = ServerState::Stopped;
        tracing::debug!(session_id = %self.session_id, "Stopping server");
        self.backend.shutdown(&self.session_id)
    }

    /// Apply the backend's asynchronous launch completion.
    ///
    /// Only applied while Working; an outcome arriving after a stop is
    /// stale and leaves the state untouched. A failed launch reverts to
    /// Stopped and surfaces as a retryable error.
    pub fn handle_launch_outcome(&mut self, outcome: LaunchOutcome) -> Result<ServerState> {
        if self.state != ServerState::Working {
            tracing::debug!(
                session_id = %self.session_id,
                state = %self.state,
                "Discarding stale launch outcome"
            );
            return Ok(self.state);
        }

        match outcome {
            LaunchOutcome::Started => {
                self.state = ServerState::Started;
                tracing::info!(session_id = %self.session_id, "Server started");
                Ok(self.state)
            }
            LaunchOutcome::Failed(reason) => {
                self.state = ServerState::Stopped;
                tracing::warn!(session_id = %self.session_id, %reason, "Server launch failed");
                Err(ServerError::StartFailure(reason))
            }
        }
    }
}

impl std::fmt::Debug for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerStatus")
            .field("session_id", &self.session_id)
            .field("state", &self.state)
            .finish()
    }
}
