//! Token commands.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use dossier_config::DossierConfig;
use dossier_server::JwtConfig;
use dossier_types::UserId;
use tracing::info;

fn jwt_config(project: &str) -> Result<JwtConfig> {
    let config = DossierConfig::load_from_dir(Path::new(project))
        .context("Failed to load configuration")?;
    JwtConfig::from_auth_config(&config.auth).context("Unusable auth configuration")
}

/// Issue a token for `subject` and print it.
pub fn issue(project: &str, subject: &str, ttl: Option<u64>) -> Result<()> {
    let user: UserId = subject
        .parse()
        .with_context(|| format!("Subject {subject:?} is not a user id"))?;

    let mut jwt = jwt_config(project)?;
    if let Some(secs) = ttl {
        jwt = jwt.with_expiration(Duration::from_secs(secs));
    }

    let token = jwt.create_token(user.to_string())?;
    info!(subject = %user, ttl_secs = jwt.expiration.as_secs(), "Issued token");
    println!("{token}");
    Ok(())
}

/// Verify `token` and print its subject.
pub fn verify(project: &str, token: &str) -> Result<()> {
    let jwt = jwt_config(project)?;
    let subject = jwt
        .verifier()
        .verify(token.trim())
        .context("Token rejected")?;
    println!("{subject}");
    Ok(())
}
