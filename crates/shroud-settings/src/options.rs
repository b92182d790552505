//! Mode-specific session options

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Payload a session carries once its sharing mode is chosen.
///
/// The tag doubles as the persisted record of which mode the session was in,
/// so a restored session reopens in the right mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ModeOptions {
    /// Share a fixed set of files with downloaders
    Share { files: Vec<PathBuf> },
    /// Receive uploads into a local directory
    Receive { download_dir: Option<PathBuf> },
    /// Serve a static website from local files
    Website { files: Vec<PathBuf> },
}

impl ModeOptions {
    pub fn empty_share() -> Self {
        ModeOptions::Share { files: Vec::new() }
    }

    pub fn empty_receive() -> Self {
        ModeOptions::Receive { download_dir: None }
    }

    pub fn empty_website() -> Self {
        ModeOptions::Website { files: Vec::new() }
    }

    /// Add a file to a share or website payload. Receive mode has no file
    /// list, so this is a no-op there.
    pub fn add_file(&mut self, path: PathBuf) {
        match self {
            ModeOptions::Share { files } | ModeOptions::Website { files } => {
                if !files.contains(&path) {
                    files.push(path);
                }
            }
            ModeOptions::Receive { .. } => {}
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        match self {
            ModeOptions::Share { files } | ModeOptions::Website { files } => files,
            ModeOptions::Receive { .. } => &[],
        }
    }

    pub fn set_download_dir(&mut self, dir: PathBuf) {
        if let ModeOptions::Receive { download_dir } = self {
            *download_dir = Some(dir);
        }
    }

    pub fn download_dir(&self) -> Option<&Path> {
        match self {
            ModeOptions::Receive { download_dir } => download_dir.as_deref(),
            _ => None,
        }
    }
}
