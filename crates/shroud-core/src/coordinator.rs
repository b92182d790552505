//! Close coordinator
//!
//! Mediates the suspend/resume boundary between close-intent evaluation and
//! the external UI. At most one prompt is outstanding; nothing underneath
//! changes until accept or reject arrives; there is no timeout.

use crate::error::CoreError;
use crate::Result;

/// What a pending prompt will close when accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTarget {
    Tab(usize),
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    Accept,
    Reject,
}

#[derive(Debug, Default)]
pub struct CloseCoordinator {
    pending: Option<CloseTarget>,
}

impl CloseCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<CloseTarget> {
        self.pending
    }

    /// Open a prompt. Refused while another prompt is outstanding; the
    /// caller coalesces the request instead.
    pub fn begin(&mut self, target: CloseTarget) -> Result<()> {
        if self.pending.is_some() {
            return Err(CoreError::PromptPending);
        }
        self.pending = Some(target);
        Ok(())
    }

    /// Take the pending prompt for resolution.
    pub fn resolve(&mut self) -> Result<CloseTarget> {
        self.pending.take().ok_or(CoreError::NoPendingPrompt)
    }
}
