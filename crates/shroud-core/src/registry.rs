//! Tab registry
//!
//! Ordered collection of tabs (insertion order = display order). Never
//! empty: closing the last tab immediately re-seeds a placeholder, so the
//! "always at least one tab" rule is a postcondition of every operation,
//! not a UI convenience.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use shroud_server::ServerBackend;
use shroud_settings::SessionSettings;
use shroud_tabs::{CloseIntent, Tab};

use crate::coordinator::CloseDecision;
use crate::error::CoreError;
use crate::Result;

/// Result of a per-tab close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The tab was torn down and removed
    Closed,
    /// A prompt must resolve first; the tab is untouched
    ConfirmationRequired,
    /// A prompt is already outstanding for this tab
    AlreadyPending,
}

/// Result of an application-quit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOutcome {
    /// No active servers; the quit may proceed
    ReadyToQuit,
    /// One aggregate prompt covers every tab with an active server
    ConfirmationRequired,
}

pub struct TabRegistry {
    tabs: Vec<Tab>,
    active: usize,
    data_dir: PathBuf,
    backend: Arc<dyn ServerBackend>,
}

impl TabRegistry {
    /// A registry starts with exactly one placeholder tab.
    pub fn new(data_dir: PathBuf, backend: Arc<dyn ServerBackend>) -> Self {
        let tabs = vec![Tab::new(data_dir.clone())];
        Self {
            tabs,
            active: 0,
            data_dir,
            backend,
        }
    }

    /// Reopen tabs for settings files persisted by a previous run. If any
    /// were restored, the seed placeholder is dropped in their favor.
    pub fn restore_persistent(&mut self) -> Result<usize> {
        let entries = match fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut restored = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match SessionSettings::load(&path) {
                Ok(settings) => match Tab::from_settings(settings, Arc::clone(&self.backend)) {
                    Ok(tab) => {
                        self.tabs.push(tab);
                        restored += 1;
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Skipping settings file")
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Unreadable settings file")
                }
            }
        }

        if restored > 0 && self.tabs.len() > restored {
            if let Some(first) = self.tabs.first() {
                if first.is_placeholder() {
                    self.tabs.remove(0);
                }
            }
        }
        self.active = 0;

        tracing::info!(restored, "Restored persistent tabs");
        Ok(restored)
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn backend(&self) -> Arc<dyn ServerBackend> {
        Arc::clone(&self.backend)
    }

    pub fn tab(&self, index: usize) -> Result<&Tab> {
        self.tabs.get(index).ok_or(CoreError::TabOutOfRange(index))
    }

    pub fn tab_mut(&mut self, index: usize) -> Result<&mut Tab> {
        self.tabs
            .get_mut(index)
            .ok_or(CoreError::TabOutOfRange(index))
    }

    /// Append a fresh placeholder tab and make it active.
    pub fn new_tab(&mut self) -> usize {
        self.tabs.push(Tab::new(self.data_dir.clone()));
        self.active = self.tabs.len() - 1;
        tracing::info!(index = self.active, "Opened new tab");
        self.active
    }

    pub fn select_tab(&mut self, index: usize) -> Result<()> {
        if index >= self.tabs.len() {
            return Err(CoreError::TabOutOfRange(index));
        }
        self.active = index;
        Ok(())
    }

    /// Evaluate a close request for one tab. Tabs with nothing to protect
    /// are torn down on the spot; the rest wait for a confirmation.
    pub fn request_close(&mut self, index: usize) -> Result<CloseOutcome> {
        let intent = self.tab_mut(index)?.request_close();
        match intent {
            CloseIntent::ReadyToClose => {
                self.tab_mut(index)?.teardown()?;
                self.remove_tab(index);
                Ok(CloseOutcome::Closed)
            }
            CloseIntent::ConfirmationRequired => Ok(CloseOutcome::ConfirmationRequired),
            CloseIntent::AlreadyPending => Ok(CloseOutcome::AlreadyPending),
        }
    }

    /// Apply the user's decision for a tab's pending prompt. Returns true
    /// iff the tab was removed.
    pub fn resolve_close(&mut self, index: usize, decision: CloseDecision) -> Result<bool> {
        let tab = self.tab_mut(index)?;
        if !tab.is_close_pending() {
            return Err(CoreError::NoPendingPrompt);
        }

        match decision {
            CloseDecision::Reject => {
                tab.cancel_close();
                Ok(false)
            }
            CloseDecision::Accept => {
                tab.teardown()?;
                self.remove_tab(index);
                Ok(true)
            }
        }
    }

    /// Application-quit path: one aggregate confirmation covers every tab
    /// with an active server. Nothing is shut down speculatively.
    pub fn request_quit(&self) -> QuitOutcome {
        if self.tabs.iter().any(Tab::is_server_active) {
            QuitOutcome::ConfirmationRequired
        } else {
            QuitOutcome::ReadyToQuit
        }
    }

    /// Confirmed quit: stop every active server. Persistent settings files
    /// are left in place so those sessions reopen on the next run.
    pub fn shutdown_all(&mut self) -> Result<()> {
        for tab in self.tabs.iter_mut() {
            if tab.is_server_active() {
                tab.stop_server()?;
            }
        }
        tracing::info!("All servers stopped");
        Ok(())
    }

    fn remove_tab(&mut self, index: usize) {
        self.tabs.remove(index);
        tracing::info!(index, "Closed tab");

        // Never leave zero tabs
        if self.tabs.is_empty() {
            self.tabs.push(Tab::new(self.data_dir.clone()));
        }

        if self.active > index {
            self.active -= 1;
        }
        if self.active >= self.tabs.len() {
            self.active = self.tabs.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shroud_settings::ModeOptions;
    use tempfile::TempDir;

    struct NullBackend;

    impl ServerBackend for NullBackend {
        fn launch(&self, _session_id: &str) -> shroud_server::Result<()> {
            Ok(())
        }

        fn shutdown(&self, _session_id: &str) -> shroud_server::Result<()> {
            Ok(())
        }
    }

    fn registry_in(dir: &TempDir) -> TabRegistry {
        TabRegistry::new(dir.path().to_path_buf(), Arc::new(NullBackend))
    }

    #[test]
    fn test_starts_with_one_placeholder() {
        let dir = TempDir::new().unwrap();
        let registry = registry_in(&dir);

        assert_eq!(registry.len(), 1);
        assert!(registry.tab(0).unwrap().is_placeholder());
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn test_open_and_close_extra_tabs() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        registry.new_tab();
        registry.new_tab();
        registry.new_tab();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.active_index(), 3);

        // Placeholders close without any prompt
        for _ in 0..3 {
            assert_eq!(registry.request_close(0).unwrap(), CloseOutcome::Closed);
        }
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_closing_last_tab_reseeds_placeholder() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        let backend = registry.backend();
        registry
            .tab_mut(0)
            .unwrap()
            .select_mode(ModeOptions::empty_share(), backend)
            .unwrap();
        let old_id = registry.tab(0).unwrap().id.clone();

        assert_eq!(registry.request_close(0).unwrap(), CloseOutcome::Closed);

        assert_eq!(registry.len(), 1);
        let fresh = registry.tab(0).unwrap();
        assert!(fresh.is_placeholder());
        assert_ne!(fresh.id, old_id);
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn test_close_with_active_server_needs_prompt() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        let backend = registry.backend();
        let tab = registry.tab_mut(0).unwrap();
        tab.select_mode(ModeOptions::empty_share(), backend).unwrap();
        tab.start_server().unwrap();

        assert_eq!(
            registry.request_close(0).unwrap(),
            CloseOutcome::ConfirmationRequired
        );
        assert_eq!(
            registry.request_close(0).unwrap(),
            CloseOutcome::AlreadyPending
        );
        assert_eq!(registry.len(), 1);

        // Reject: everything as it was
        assert!(!registry.resolve_close(0, CloseDecision::Reject).unwrap());
        assert!(registry.tab(0).unwrap().is_server_active());

        // Accept after a second request
        registry.request_close(0).unwrap();
        assert!(registry.resolve_close(0, CloseDecision::Accept).unwrap());
        assert_eq!(registry.len(), 1);
        assert!(registry.tab(0).unwrap().is_placeholder());
    }

    #[test]
    fn test_other_tabs_usable_while_prompt_pending() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        let backend = registry.backend();
        let tab = registry.tab_mut(0).unwrap();
        tab.select_mode(ModeOptions::empty_share(), backend).unwrap();
        tab.start_server().unwrap();
        registry.request_close(0).unwrap();

        // New tabs and selection still work while tab 0 waits
        let index = registry.new_tab();
        registry.select_tab(index).unwrap();
        registry.select_tab(0).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_active_index_tracks_removals() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        registry.new_tab();
        registry.new_tab();
        registry.select_tab(2).unwrap();

        registry.request_close(0).unwrap();
        assert_eq!(registry.active_index(), 1);

        registry.request_close(1).unwrap();
        assert_eq!(registry.active_index(), 0);
    }

    #[test]
    fn test_quit_prompts_only_for_active_servers() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        assert_eq!(registry.request_quit(), QuitOutcome::ReadyToQuit);

        let backend = registry.backend();
        let tab = registry.tab_mut(0).unwrap();
        tab.select_mode(ModeOptions::empty_receive(), backend).unwrap();
        tab.start_server().unwrap();

        assert_eq!(registry.request_quit(), QuitOutcome::ConfirmationRequired);
    }

    #[test]
    fn test_confirmed_quit_keeps_persistent_files() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        let backend = registry.backend();
        let tab = registry.tab_mut(0).unwrap();
        tab.select_mode(ModeOptions::empty_share(), backend).unwrap();
        tab.set_persistent(true).unwrap();
        tab.start_server().unwrap();
        let path = tab.settings().storage_path().unwrap().to_path_buf();

        registry.shutdown_all().unwrap();

        assert!(!registry.tab(0).unwrap().is_server_active());
        // Quit is not a per-tab confirmed close: the session must reopen
        assert!(path.exists());
    }

    #[test]
    fn test_restore_persistent_tabs() {
        let dir = TempDir::new().unwrap();

        {
            let mut registry = registry_in(&dir);
            let backend = registry.backend();
            let tab = registry.tab_mut(0).unwrap();
            tab.select_mode(ModeOptions::empty_receive(), backend).unwrap();
            tab.set_persistent(true).unwrap();
        }

        // Simulated restart
        let mut registry = registry_in(&dir);
        let restored = registry.restore_persistent().unwrap();

        assert_eq!(restored, 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.tab(0).unwrap().mode(), shroud_tabs::Mode::Receive);
        assert!(registry.tab(0).unwrap().settings().is_persistent());
    }

    #[test]
    fn test_restore_with_no_files_keeps_placeholder() {
        let dir = TempDir::new().unwrap();
        let mut registry = registry_in(&dir);

        assert_eq!(registry.restore_persistent().unwrap(), 0);
        assert_eq!(registry.len(), 1);
        assert!(registry.tab(0).unwrap().is_placeholder());
    }
}
