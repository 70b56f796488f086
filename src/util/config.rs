//! Configuration file support for socstage.
//!
//! socstage reads two configuration files:
//! - Global: `<config dir>/config.toml` - user-wide defaults
//! - Project: `.socstage/config.toml` - project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sources::FetchOptions;

/// socstage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// Core library settings
    pub library: LibraryConfig,

    /// Network settings
    pub net: NetConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Root under which each system gets its own build directory
    pub build_root: Option<PathBuf>,

    /// Copy core sources into the build tree (default: true)
    pub export: Option<bool>,

    /// System core to build when none is named on the command line
    pub toplevel: Option<String>,
}

/// Core library configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Directories searched for `*.core.toml` manifests
    pub cores_root: Vec<PathBuf>,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Offline mode (don't fetch from network)
    pub offline: bool,

    /// Download timeout in seconds
    pub timeout: Option<u64>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.build_root.is_some() {
            self.build.build_root = other.build.build_root;
        }
        if other.build.export.is_some() {
            self.build.export = other.build.export;
        }
        if other.build.toplevel.is_some() {
            self.build.toplevel = other.build.toplevel;
        }

        if !other.library.cores_root.is_empty() {
            self.library.cores_root = other.library.cores_root;
        }

        if other.net.offline {
            self.net.offline = true;
        }
        if other.net.timeout.is_some() {
            self.net.timeout = other.net.timeout;
        }
    }

    /// Whether sources are copied into the build tree.
    pub fn export(&self) -> bool {
        self.build.export.unwrap_or(true)
    }

    /// Fetch settings derived from `[net]`.
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            offline: self.net.offline,
            timeout: self.net.timeout.map(Duration::from_secs),
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.socstage/config.toml)
/// 2. Global config (<config dir>/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}
