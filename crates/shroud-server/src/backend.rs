//! External server capability
//!
//! The core only needs launch and shutdown, keyed by session id. Bind
//! success or failure arrives later as a [`LaunchOutcome`] fed through
//! [`ServerStatus::handle_launch_outcome`].
//!
//! [`LaunchOutcome`]: crate::LaunchOutcome
//! [`ServerStatus::handle_launch_outcome`]: crate::ServerStatus::handle_launch_outcome

use crate::Result;

pub trait ServerBackend: Send + Sync {
    /// Begin launching a server for the given session. Must return quickly;
    /// the bind result is reported asynchronously.
    fn launch(&self, session_id: &str) -> Result<()>;

    /// Tear down the session's server. Idempotent.
    fn shutdown(&self, session_id: &str) -> Result<()>;
}
