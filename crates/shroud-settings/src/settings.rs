//! Per-session settings with optional on-disk persistence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::SettingsError;
use crate::options::ModeOptions;
use crate::Result;

/// A session's configuration, persisted to one JSON file when the user
/// enables persistence.
///
/// Invariant: `storage_path` is set iff the session is persistent, and the
/// file at that path exists iff the session is persistent. The in-memory
/// flag is never flipped when the matching file operation failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Unique identifier, doubles as the storage file stem
    pub id: String,
    /// Mode-specific payload, absent until a mode is selected
    options: Option<ModeOptions>,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    // Persistence is signalled by the file's existence alone, so none of
    // the bookkeeping below is written into the file.
    #[serde(skip)]
    persistent: bool,
    #[serde(skip)]
    storage_path: Option<PathBuf>,
    #[serde(skip)]
    data_dir: PathBuf,
}

impl SessionSettings {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            options: None,
            created_at: Utc::now(),
            persistent: false,
            storage_path: None,
            data_dir,
        }
    }

    /// Read a persisted session back from disk (application restart path).
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        let mut settings: SessionSettings = serde_json::from_str(&json)?;
        settings.data_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        settings.persistent = true;
        settings.storage_path = Some(path.to_path_buf());
        Ok(settings)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.storage_path.as_deref()
    }

    pub fn storage_file_exists(&self) -> bool {
        self.storage_path.as_deref().map(Path::exists).unwrap_or(false)
    }

    pub fn options(&self) -> Option<&ModeOptions> {
        self.options.as_ref()
    }

    /// Replace the mode payload, rewriting the storage file when persistent.
    pub fn set_options(&mut self, options: ModeOptions) -> Result<()> {
        self.options = Some(options);
        self.rewrite_if_persistent()
    }

    /// Add a file to the payload, rewriting the storage file when persistent.
    pub fn add_file(&mut self, path: PathBuf) -> Result<()> {
        let options = self.options.as_mut().ok_or(SettingsError::NoModeSelected)?;
        options.add_file(path);
        self.rewrite_if_persistent()
    }

    /// Write the settings file and flip the flag. Durable before returning:
    /// a subsequent existence check sees the file.
    pub fn enable_persistence(&mut self) -> Result<()> {
        if self.options.is_none() {
            return Err(SettingsError::NoModeSelected);
        }
        if self.persistent {
            return Ok(());
        }

        let path = self.data_dir.join(format!("{}.json", self.id));
        self.write_to(&path)?;
        self.persistent = true;
        self.storage_path = Some(path);

        tracing::info!(session_id = %self.id, "Enabled persistence");
        Ok(())
    }

    /// Remove the settings file and clear the flag. Idempotent.
    pub fn disable_persistence(&mut self) -> Result<()> {
        let was_persistent = self.persistent;
        self.delete()?;
        if was_persistent {
            tracing::info!(session_id = %self.id, "Disabled persistence");
        }
        Ok(())
    }

    /// Unconditional removal of the storage file, regardless of the flag.
    /// Used during confirmed-close teardown. Idempotent.
    pub fn delete(&mut self) -> Result<()> {
        if let Some(path) = self.storage_path.clone() {
            remove_if_present(&path)?;
        }
        self.persistent = false;
        self.storage_path = None;
        Ok(())
    }

    fn rewrite_if_persistent(&self) -> Result<()> {
        if self.persistent {
            if let Some(path) = self.storage_path.as_ref() {
                self.write_to(path)?;
            }
        }
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;

        // Write-then-rename so an existence check never sees a partial file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn settings_in(dir: &TempDir) -> SessionSettings {
        SessionSettings::new(dir.path().to_path_buf())
    }

    /// The flag and the file must agree after every operation.
    fn assert_invariant(settings: &SessionSettings) {
        assert_eq!(settings.is_persistent(), settings.storage_file_exists());
        assert_eq!(settings.is_persistent(), settings.storage_path().is_some());
    }

    #[test]
    fn test_new_settings_are_not_persistent() {
        let dir = TempDir::new().unwrap();
        let settings = settings_in(&dir);
        assert!(!settings.is_persistent());
        assert_invariant(&settings);
    }

    #[test]
    fn test_enable_requires_a_mode() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        assert!(matches!(
            settings.enable_persistence(),
            Err(SettingsError::NoModeSelected)
        ));
        assert_invariant(&settings);
    }

    #[test]
    fn test_enable_disable_cycle() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        settings.set_options(ModeOptions::empty_share()).unwrap();

        settings.enable_persistence().unwrap();
        assert!(settings.is_persistent());
        assert!(settings.storage_file_exists());
        assert_invariant(&settings);

        // Enabling twice is a no-op
        settings.enable_persistence().unwrap();
        assert_invariant(&settings);

        settings.disable_persistence().unwrap();
        assert!(!settings.is_persistent());
        assert_invariant(&settings);

        // Disabling twice is a no-op
        settings.disable_persistence().unwrap();
        assert_invariant(&settings);
    }

    #[test]
    fn test_delete_removes_persistent_file() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        settings.set_options(ModeOptions::empty_receive()).unwrap();
        settings.enable_persistence().unwrap();
        let path = settings.storage_path().unwrap().to_path_buf();

        settings.delete().unwrap();
        assert!(!path.exists());
        assert!(!settings.is_persistent());
        assert_invariant(&settings);

        // Deleting again is not an error
        settings.delete().unwrap();
    }

    #[test]
    fn test_persistent_file_tracks_added_files() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        settings.set_options(ModeOptions::empty_share()).unwrap();
        settings.enable_persistence().unwrap();

        settings.add_file(PathBuf::from("/tmp/report.pdf")).unwrap();

        let path = settings.storage_path().unwrap();
        let restored = SessionSettings::load(path).unwrap();
        assert_eq!(
            restored.options().unwrap().files(),
            &[PathBuf::from("/tmp/report.pdf")]
        );
    }

    #[test]
    fn test_load_restores_persistence() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        settings.set_options(ModeOptions::empty_website()).unwrap();
        settings.enable_persistence().unwrap();
        let path = settings.storage_path().unwrap().to_path_buf();

        let restored = SessionSettings::load(&path).unwrap();
        assert_eq!(restored.id, settings.id);
        assert!(restored.is_persistent());
        assert!(restored.storage_file_exists());
        assert_invariant(&restored);
    }

    #[test]
    fn test_failed_removal_keeps_the_flag() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        settings.set_options(ModeOptions::empty_share()).unwrap();
        settings.enable_persistence().unwrap();
        let path = settings.storage_path().unwrap().to_path_buf();

        // Swap the file for a non-empty directory so removal fails
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), b"x").unwrap();

        assert!(settings.disable_persistence().is_err());
        assert!(settings.is_persistent());
        assert!(settings.storage_path().is_some());
    }

    #[test]
    fn test_add_file_without_mode_fails() {
        let dir = TempDir::new().unwrap();
        let mut settings = settings_in(&dir);
        assert!(matches!(
            settings.add_file(PathBuf::from("/tmp/a.txt")),
            Err(SettingsError::NoModeSelected)
        ));
    }
}
