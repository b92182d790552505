//! Sharing modes

use serde::{Deserialize, Serialize};

use shroud_settings::ModeOptions;

/// The sharing behavior a tab performs. A tab starts as the `NewTab`
/// placeholder and leaves it exactly once; closing and reopening creates a
/// new tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Mode picker is showing; no server, no payload
    #[serde(rename = "new-tab")]
    NewTab,
    Share,
    Receive,
    Website,
}

impl Mode {
    /// The mode a payload belongs to.
    pub fn of(options: &ModeOptions) -> Mode {
        match options {
            ModeOptions::Share { .. } => Mode::Share,
            ModeOptions::Receive { .. } => Mode::Receive,
            ModeOptions::Website { .. } => Mode::Website,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Mode::NewTab)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::NewTab => "new-tab",
            Mode::Share => "share",
            Mode::Receive => "receive",
            Mode::Website => "website",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new-tab" => Ok(Mode::NewTab),
            "share" => Ok(Mode::Share),
            "receive" => Ok(Mode::Receive),
            "website" => Ok(Mode::Website),
            _ => Err(format!("Unknown mode: {}", s)),
        }
    }
}
