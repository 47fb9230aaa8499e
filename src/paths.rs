use anyhow::{Context, Result};
use directories::BaseDirs;
use std::path::PathBuf;

/// Environment variable that relocates the whole storage directory
pub const HOME_ENV_VAR: &str = "ENVSWITCH_HOME";

/// All computed paths used by envswitch
#[derive(Debug, Clone)]
pub struct Paths {
    /// ~/.envswitch
    pub base_dir: PathBuf,
    /// ~/.envswitch/environments.json
    pub environments_file: PathBuf,
    /// ~/.envswitch/history.json
    pub history_file: PathBuf,
}

impl Paths {
    /// Resolve the storage layout, honouring `ENVSWITCH_HOME` before the
    /// home-directory default.
    pub fn new() -> Result<Self> {
        if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(Self::at(dir));
        }

        let base_dirs = BaseDirs::new().context("Failed to determine home directory")?;
        Ok(Self::at(base_dirs.home_dir().join(".envswitch")))
    }

    /// Build the storage layout under an explicit directory
    pub fn at(base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        let environments_file = base_dir.join("environments.json");
        let history_file = base_dir.join("history.json");

        Self {
            base_dir,
            environments_file,
            history_file,
        }
    }
}
