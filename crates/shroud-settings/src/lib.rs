//! Shroud Session Settings
//!
//! One JSON file per persistent session; the file's existence is the
//! authoritative signal of persistence. Non-persistent sessions never touch
//! the disk.

mod error;
mod options;
mod settings;

pub use error::SettingsError;
pub use options::ModeOptions;
pub use settings::SessionSettings;

pub type Result<T> = std::result::Result<T, SettingsError>;
