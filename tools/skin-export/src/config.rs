//! skin-export.toml settings
//!
//! Every field is optional; a missing file means defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name searched in the working directory and the user config dir
pub const CONFIG_FILE_NAME: &str = "skin-export.toml";

/// Token replaced by the host's project root
pub const PROJECT_TOKEN: &str = "{project}/";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory exports go to when no output path is given.
    /// May start with `{project}/`.
    pub export_dir: String,

    /// Creator written into exported metadata. Defaults to the login name.
    pub creator: Option<String>,

    /// Write indented JSON
    pub pretty: bool,

    /// When set, imports fail if any vertex's weights sum farther than this
    /// from 1.0. Unset means weights are not checked.
    pub normalization_tolerance: Option<f64>,

    /// Largest document accepted on import
    pub max_document_bytes: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            export_dir: format!("{}data", PROJECT_TOKEN),
            creator: None,
            pretty: false,
            normalization_tolerance: None,
            max_document_bytes: 256 * 1024 * 1024, // 256 MiB
        }
    }
}

impl SessionConfig {
    /// Load from an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid skin-export.toml")
    }

    /// Load from `explicit` if given, else `./skin-export.toml`, else the
    /// user config directory, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidates = [Some(PathBuf::from(CONFIG_FILE_NAME)), user_config_path()];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                tracing::debug!("Using config {}", path.display());
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Creator name: configured value, else the login name, else "unknown".
    pub fn creator_name(&self) -> String {
        self.creator
            .clone()
            .or_else(login_name)
            .unwrap_or_else(|| "unknown".to_string())
    }
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("io", "nethercore", "skin-export")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn login_name() -> Option<String> {
    ["USER", "USERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
}
