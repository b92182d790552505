//! Application facade
//!
//! The single entry point the GUI shell talks to. Intents come in through
//! [`App::handle_event`]; state changes flow back over an unbounded
//! notification channel. Tab state is serialized behind the registry lock
//! and prompt bookkeeping behind the coordinator lock. Every close path
//! acquires the coordinator lock first and holds it across the registry
//! call, so checking for a pending prompt, flipping a tab to pending, and
//! registering the prompt are one atomic step.

use parking_lot::RwLock;
use std::fs;
use std::sync::Arc;

use tokio::sync::mpsc;

use shroud_server::{LaunchOutcome, ServerBackend, ServerError, ServerState};
use shroud_tabs::TabError;

use crate::config::Config;
use crate::coordinator::{CloseCoordinator, CloseDecision, CloseTarget};
use crate::error::CoreError;
use crate::events::{Notification, UiEvent};
use crate::registry::{CloseOutcome, QuitOutcome, TabRegistry};
use crate::Result;

pub struct App {
    registry: Arc<RwLock<TabRegistry>>,
    coordinator: Arc<RwLock<CloseCoordinator>>,
    notifications: mpsc::UnboundedSender<Notification>,
    config: Config,
}

impl App {
    /// Build the app and the notification stream the GUI shell consumes.
    pub fn new(
        config: Config,
        backend: Arc<dyn ServerBackend>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<Notification>)> {
        fs::create_dir_all(&config.data_dir)?;

        let registry = TabRegistry::new(config.data_dir.clone(), backend);
        let (tx, rx) = mpsc::unbounded_channel();

        let app = Self {
            registry: Arc::new(RwLock::new(registry)),
            coordinator: Arc::new(RwLock::new(CloseCoordinator::new())),
            notifications: tx,
            config,
        };

        Ok((app, rx))
    }

    /// Reopen sessions persisted by a previous run.
    pub fn initialize(&self) -> Result<usize> {
        let restored = self.registry.write().restore_persistent()?;
        tracing::info!(restored, "App initialized");
        Ok(restored)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tab_count(&self) -> usize {
        self.registry.read().len()
    }

    pub fn active_index(&self) -> usize {
        self.registry.read().active_index()
    }

    /// Handle one user intent. Failures are never fatal: they surface as
    /// [`Notification::Error`] and the application stays usable.
    pub fn handle_event(&self, event: UiEvent) {
        if let Err(e) = self.dispatch(event) {
            tracing::warn!(error = %e, "Event failed");
            self.notify(Notification::Error(e.to_string()));
        }
    }

    /// Entry point for the external server's asynchronous launch completion.
    pub fn handle_launch_outcome(&self, index: usize, outcome: LaunchOutcome) {
        let result = {
            let mut registry = self.registry.write();
            registry
                .tab_mut(index)
                .and_then(|tab| Ok(tab.handle_launch_outcome(outcome)?))
        };

        match result {
            Ok(state) => self.notify(Notification::StatusChanged(index, state)),
            Err(e) => {
                // A failed launch reverted the tab to stopped; report both
                if matches!(
                    e,
                    CoreError::Tab(TabError::Server(ServerError::StartFailure(_)))
                ) {
                    self.notify(Notification::StatusChanged(index, ServerState::Stopped));
                }
                self.notify(Notification::Error(e.to_string()));
            }
        }
    }

    fn dispatch(&self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::NewTab => {
                let index = self.registry.write().new_tab();
                self.notify(Notification::TabOpened(index));
            }
            UiEvent::SelectTab(index) => {
                self.registry.write().select_tab(index)?;
            }
            UiEvent::CloseTab(index) => {
                self.close_tab(index)?;
            }
            UiEvent::ModeSelected(index, options) => {
                let mut registry = self.registry.write();
                let backend = registry.backend();
                registry.tab_mut(index)?.select_mode(options, backend)?;
            }
            UiEvent::AddFile(index, path) => {
                self.registry.write().tab_mut(index)?.add_file(path)?;
            }
            UiEvent::StartServer(index) => {
                self.registry.write().tab_mut(index)?.start_server()?;
                self.notify(Notification::StatusChanged(index, ServerState::Working));
            }
            UiEvent::StopServer(index) => {
                self.registry.write().tab_mut(index)?.stop_server()?;
                self.notify(Notification::StatusChanged(index, ServerState::Stopped));
            }
            UiEvent::EnablePersistence(index) => {
                self.registry.write().tab_mut(index)?.set_persistent(true)?;
            }
            UiEvent::DisablePersistence(index) => {
                self.registry.write().tab_mut(index)?.set_persistent(false)?;
            }
            UiEvent::AcceptClose => {
                self.resolve_close(CloseDecision::Accept)?;
            }
            UiEvent::RejectClose => {
                self.resolve_close(CloseDecision::Reject)?;
            }
            UiEvent::Quit => {
                self.quit()?;
            }
        }
        Ok(())
    }

    fn close_tab(&self, index: usize) -> Result<()> {
        // Coordinator lock first, held across the registry call: the tab
        // can only flip to pending together with its prompt
        let mut coordinator = self.coordinator.write();
        if coordinator.pending().is_some() {
            // One outstanding prompt at a time; repeat requests coalesce
            tracing::debug!(index, "Ignoring close request while a prompt is pending");
            return Ok(());
        }

        let outcome = self.registry.write().request_close(index)?;
        match outcome {
            CloseOutcome::Closed => {
                self.notify(Notification::TabClosed(index));
            }
            CloseOutcome::ConfirmationRequired => {
                coordinator.begin(CloseTarget::Tab(index))?;
                self.notify(Notification::ConfirmClose(CloseTarget::Tab(index)));
            }
            CloseOutcome::AlreadyPending => {}
        }
        Ok(())
    }

    fn resolve_close(&self, decision: CloseDecision) -> Result<()> {
        let mut coordinator = self.coordinator.write();
        let target = coordinator.resolve()?;
        match target {
            CloseTarget::Tab(index) => {
                let closed = self.registry.write().resolve_close(index, decision)?;
                if closed {
                    self.notify(Notification::TabClosed(index));
                }
            }
            CloseTarget::Quit => {
                if decision == CloseDecision::Accept {
                    self.registry.write().shutdown_all()?;
                    self.notify(Notification::QuitReady);
                }
                // Rejected: nothing was touched, the application stays open
            }
        }
        Ok(())
    }

    fn quit(&self) -> Result<()> {
        let mut coordinator = self.coordinator.write();
        if coordinator.pending().is_some() {
            tracing::debug!("Ignoring quit request while a prompt is pending");
            return Ok(());
        }

        let outcome = self.registry.read().request_quit();
        match outcome {
            QuitOutcome::ReadyToQuit => {
                self.registry.write().shutdown_all()?;
                self.notify(Notification::QuitReady);
            }
            QuitOutcome::ConfirmationRequired => {
                coordinator.begin(CloseTarget::Quit)?;
                self.notify(Notification::ConfirmClose(CloseTarget::Quit));
            }
        }
        Ok(())
    }

    fn notify(&self, notification: Notification) {
        // The receiver living as long as the app is the shell's concern;
        // a dropped receiver only loses notifications
        let _ = self.notifications.send(notification);
    }
}

impl Clone for App {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            coordinator: Arc::clone(&self.coordinator),
            notifications: self.notifications.clone(),
            config: self.config.clone(),
        }
    }
}
