//! Engine-level settings for loading structure templates.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default blueprint folder
pub const DEFAULT_FOLDER: &str = "assets/iwgos";

/// Blueprint file extension
pub const BLUEPRINT_EXTENSION: &str = "json";

/// How strictly a template treats broken instructions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadPolicy {
    /// Log and drop instructions that fail to load instead of failing the template
    pub skip_failed_instructions: bool,
}

impl LoadPolicy {
    /// Any broken instruction fails the whole template.
    pub const STRICT: LoadPolicy = LoadPolicy {
        skip_failed_instructions: false,
    };

    /// Broken instructions are logged and left out.
    pub const LENIENT: LoadPolicy = LoadPolicy {
        skip_failed_instructions: true,
    };
}

/// Configuration for [`IwgoManager`](super::IwgoManager)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Folder scanned for `*.json` blueprints
    pub folder: PathBuf,
    /// Instruction failure handling
    pub policy: LoadPolicy,
    /// Seed applied to every loaded template (`None` keeps each template's default)
    pub seed: Option<u64>,
    /// Optional material palette file (`{ "name": id }`) merged over the defaults
    pub palette: Option<PathBuf>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            folder: PathBuf::from(DEFAULT_FOLDER),
            policy: LoadPolicy::default(),
            seed: None,
            palette: None,
        }
    }
}

impl ManagerConfig {
    pub fn with_folder(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            ..Self::default()
        }
    }

    /// Save to file (sync)
    pub fn save_sync(&self, path: &Path) -> Result<(), io::Error> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
    }

    /// Load from file (sync). Missing fields take their defaults.
    pub fn load_sync(path: &Path) -> Result<Self, io::Error> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
