//! Configuration management commands.

use anyhow::{Context, Result};
use dossier_config::{DossierConfig, Paths};
use std::path::Path;

use crate::OutputFormat;

/// Show current configuration.
pub fn show(project: &str, format: OutputFormat) -> Result<()> {
    let project_path = Path::new(project);
    let config = DossierConfig::load_from_dir(project_path)
        .context("Failed to load configuration")?
        .redacted();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Toml => println!("{}", toml::to_string_pretty(&config)?),
        OutputFormat::Text => {
            println!("Dossier Configuration");
            println!("=====================\n");

            if !Paths::is_initialized(project_path) {
                println!(
                    "(no dossier.toml in {}; defaults and environment only)\n",
                    project_path.display()
                );
            }

            println!("Auth:");
            println!(
                "  Secret: {}",
                if config.auth.jwt_secret.is_empty() { "not set" } else { "set" }
            );
            println!(
                "  Issuer: {}",
                config.auth.issuer.as_deref().unwrap_or("None")
            );
            println!("  Token TTL: {}s", config.auth.token_ttl_secs);
            println!("  Leeway: {}s", config.auth.leeway_secs);
            println!();

            println!("Gate:");
            println!("  Login path: {}", config.gate.login_path);
            println!("  Register path: {}", config.gate.register_path);
            println!("  Public prefixes: {}", config.gate.public_prefixes.join(", "));
            println!();

            println!("Pagination:");
            println!("  Default page size: {}", config.pagination.default_page_size);
            println!("  Max page size: {}", config.pagination.max_page_size);
        }
    }

    Ok(())
}

/// Validate configuration files.
pub fn validate(project: &str) -> Result<()> {
    let project_path = Path::new(project);

    println!("Validating configuration in {}...", project_path.display());

    let config = DossierConfig::load_from_dir(project_path)
        .context("Failed to load configuration")?;

    match config.validate() {
        Ok(()) => {
            println!("✓ Configuration is valid");
            Ok(())
        }
        Err(e) => {
            println!("✗ Configuration validation failed:");
            println!("  {e}");
            Err(e.into())
        }
    }
}
