//! Errors raised while locating, merging, or checking Dossier settings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A `dossier.toml` (or other explicitly named file) could not be read.
    #[error("cannot read settings file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A settings file is not valid TOML or does not fit [`DossierConfig`](crate::DossierConfig).
    #[error("settings file {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Layering defaults, files, and `DOSSIER_*` variables failed.
    #[error("cannot merge settings layers: {0}")]
    Merge(String),

    /// Settings were loaded but the server cannot run with them.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The platform has no home directory to hold the per-user settings file.
    #[error("no per-user settings directory on this platform")]
    NoUserDirectory,
}
