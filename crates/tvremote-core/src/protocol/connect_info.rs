//! Identity a device announces when it connects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Device name plus an optional application version.
///
/// Immutable once built.  Display renders as `name[version]`, or
/// `name[unset]` when no version was given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectInfo {
    device_name: String,
    version: Option<u32>,
}

impl ConnectInfo {
    /// Creates connect info with no version.
    pub fn new(device_name: impl Into<String>) -> Self {
        Self {
            device_name: device_name.into(),
            version: None,
        }
    }

    /// Creates connect info carrying an application version.
    pub fn with_version(device_name: impl Into<String>, version: u32) -> Self {
        Self {
            device_name: device_name.into(),
            version: Some(version),
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn version(&self) -> Option<u32> {
        self.version
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }
}

impl fmt::Display for ConnectInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "{}[{}]", self.device_name, v),
            None => write!(f, "{}[unset]", self.device_name),
        }
    }
}
