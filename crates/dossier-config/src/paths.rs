//! Where Dossier looks for its settings files.
//!
//! A project directory holds `dossier.toml` and an optional, uncommitted
//! `dossier.local.toml`. Per-user defaults live in the platform config
//! directory (`$XDG_CONFIG_HOME/dossier/config.toml` on Linux).

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = "dossier.toml";
const LOCAL_FILE: &str = "dossier.local.toml";
const USER_FILE: &str = "config.toml";

/// Settings file locations for one machine.
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("com", "Dossier", "dossier"),
        }
    }

    /// Per-user settings file, layered below the project files.
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|dirs| dirs.config_dir().join(USER_FILE))
            .ok_or(ConfigError::NoUserDirectory)
    }

    /// Shared project settings, normally committed alongside the deployment.
    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(PROJECT_FILE)
    }

    /// Machine-local overrides such as the JWT secret.
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join(LOCAL_FILE)
    }

    /// Whether `project_dir` carries a `dossier.toml`.
    pub fn is_initialized(project_dir: impl AsRef<Path>) -> bool {
        Self::project_config_file(project_dir).exists()
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
