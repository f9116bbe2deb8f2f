//! Dossier command-line tool.
//!
//! Issues and checks bearer tokens with the configured signing secret, and
//! inspects the layered configuration.
//!
//! # Quick Start
//!
//! ```bash
//! # Check the configuration in the current project
//! dossier config validate
//!
//! # Issue a token for a user and verify it
//! TOKEN=$(dossier token issue --subject 11111111-1111-1111-1111-111111111111)
//! dossier token verify "$TOKEN"
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

/// Dossier - profile records behind bearer-token authentication.
#[derive(Parser)]
#[command(name = "dossier")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Bearer token commands.
    #[command(subcommand)]
    Token(TokenCommands),

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum TokenCommands {
    /// Issue a signed token for a user.
    Issue {
        /// User ID to place in the `sub` claim.
        #[arg(short, long)]
        subject: String,

        /// Lifetime in seconds (defaults to `auth.token_ttl_secs`).
        #[arg(long)]
        ttl: Option<u64>,

        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: String,
    },

    /// Verify a token and print its subject.
    Verify {
        /// The compact JWT.
        token: String,

        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration with the secret redacted.
    Show {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: String,
    },

    /// Check that the configuration is usable.
    Validate {
        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Toml,
    Json,
}

fn main() -> Result<()> {
    // Logs go to stderr so token output stays pipeable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Token(cmd) => match cmd {
            TokenCommands::Issue {
                subject,
                ttl,
                project,
            } => commands::token::issue(&project, &subject, ttl),
            TokenCommands::Verify { token, project } => commands::token::verify(&project, &token),
        },
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { format, project } => commands::config::show(&project, format),
            ConfigCommands::Validate { project } => commands::config::validate(&project),
        },
    }
}
