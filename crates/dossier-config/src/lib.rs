//! Configuration management for Dossier
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (`DOSSIER_<SECTION>__<KEY>`, highest precedence)
//! 2. dossier.local.toml (gitignored, local overrides)
//! 3. dossier.toml (git-tracked, project config)
//! 4. ~/.config/dossier/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Minimum decoded length of the token signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Main Dossier configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DossierConfig {
    pub auth: AuthConfig,
    pub gate: GateConfig,
    pub pagination: PaginationConfig,
}

/// Bearer-token settings.
///
/// The secret is process-wide and read once at startup.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Base64-encoded HMAC secret.
    pub jwt_secret: String,
    /// Required `iss` claim, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Lifetime of issued tokens.
    pub token_ttl_secs: u64,
    /// Clock skew tolerated when checking `exp`.
    pub leeway_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            issuer: None,
            token_ttl_secs: 3600,
            leeway_secs: 0,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &REDACTED)
            .field("issuer", &self.issuer)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

const REDACTED: &str = "<redacted>";

impl AuthConfig {
    /// Decodes the configured secret.
    pub fn decoded_secret(&self) -> Result<Vec<u8>, ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.jwt_secret is not set".to_string(),
            ));
        }

        let bytes = STANDARD.decode(self.jwt_secret.trim()).map_err(|e| {
            ConfigError::Invalid(format!("auth.jwt_secret is not valid base64: {e}"))
        })?;

        if bytes.len() < MIN_SECRET_LEN {
            return Err(ConfigError::Invalid(format!(
                "auth.jwt_secret must decode to at least {MIN_SECRET_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        Ok(bytes)
    }
}

/// Which requests skip authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub login_path: String,
    pub register_path: String,
    /// Documentation and introspection prefixes.
    pub public_prefixes: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: "/user/login".to_string(),
            register_path: "/user/register".to_string(),
            public_prefixes: vec!["/swagger-ui/".to_string(), "/v3/api-docs".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl DossierConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Parses a single TOML file, without merging any other source.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Malformed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the settings the server cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.auth.decoded_secret()?;

        let PaginationConfig {
            default_page_size,
            max_page_size,
        } = self.pagination;
        if default_page_size == 0 || max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "page sizes must be positive".to_string(),
            ));
        }
        if default_page_size > max_page_size {
            return Err(ConfigError::Invalid(format!(
                "pagination.default_page_size ({default_page_size}) exceeds max_page_size ({max_page_size})"
            )));
        }

        for path in [&self.gate.login_path, &self.gate.register_path]
            .into_iter()
            .chain(&self.gate.public_prefixes)
        {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "gate path {path:?} must start with '/'"
                )));
            }
        }

        Ok(())
    }

    /// Copy safe to print: the secret is replaced by a placeholder.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.auth.jwt_secret.is_empty() {
            copy.auth.jwt_secret = REDACTED.to_string();
        }
        copy
    }
}
