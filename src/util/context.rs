//! Global context for socstage operations.
//!
//! Provides centralized access to configuration, paths, and environment.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use directories::ProjectDirs;

use crate::util::config::{load_config, Config};

/// Overrides the directory holding global config and the source cache.
pub const HOME_ENV: &str = "SOCSTAGE_HOME";

/// Project directories for socstage
static PROJECT_DIRS: LazyLock<Option<ProjectDirs>> =
    LazyLock::new(|| ProjectDirs::from("com", "socstage", "socstage"));

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Directory holding the global config file
    config_dir: PathBuf,

    /// Directory holding fetched core sources
    cache_root: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;

        let (config_dir, cache_root) = match std::env::var_os(HOME_ENV) {
            Some(home) => {
                let home = PathBuf::from(home);
                (home.clone(), home.join("cache"))
            }
            None => match PROJECT_DIRS.as_ref() {
                Some(dirs) => (dirs.config_dir().to_path_buf(), dirs.cache_dir().to_path_buf()),
                None => {
                    let home = directories::BaseDirs::new()
                        .map(|b| b.home_dir().join(".socstage"))
                        .unwrap_or_else(|| PathBuf::from(".socstage"));
                    (home.clone(), home.join("cache"))
                }
            },
        };

        Ok(GlobalContext {
            cwd,
            config_dir,
            cache_root,
        })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Get the project-local socstage directory.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(".socstage")
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Get the cache directory for fetched core sources.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_root.join("cores")
    }

    /// Load the merged global and project configuration.
    pub fn config(&self) -> Config {
        load_config(&self.config_path(), &self.project_config_path())
    }

    /// Resolve a possibly relative path against the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}
