//! Enumerated execution platforms.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Operating systems an artifact may declare support for.
///
/// The set is closed: a definition naming anything else fails to load.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
pub enum Platform {
    Linux,
    Windows,
    Darwin,
}

impl Platform {
    /// Every platform, in canonical order. Definitions without an explicit
    /// `supported_os` default to all of them.
    pub const ALL: [Platform; 3] = [Platform::Linux, Platform::Windows, Platform::Darwin];

    /// Platform of the running host, if it maps onto the enumerated set.
    pub fn current() -> Option<Platform> {
        match std::env::consts::OS {
            "linux" => Some(Platform::Linux),
            "windows" => Some(Platform::Windows),
            "macos" => Some(Platform::Darwin),
            _ => None,
        }
    }

    /// Parse the canonical name used in definition files.
    pub fn from_name(name: &str) -> Option<Platform> {
        match name {
            "Linux" => Some(Platform::Linux),
            "Windows" => Some(Platform::Windows),
            "Darwin" => Some(Platform::Darwin),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
            Platform::Darwin => "Darwin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
