//! CLI commands

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use porpagar_http::TypedClientBuilder;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::config::{self, VerifyConfig};
use crate::verify::Verifier;

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the backend answers its public and authenticated endpoints
    Verify {
        /// Backend origin, e.g. https://porpagar.mx
        base_url: Option<String>,

        /// Account to log in with
        #[arg(short, long, env = "PORPAGAR_USERNAME")]
        username: Option<String>,

        /// Password for the account
        #[arg(short, long, env = "PORPAGAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Write a default configuration file
    Config {
        /// Output file path
        #[arg(default_value = "porpagar.toml")]
        output: PathBuf,
    },
}

impl Commands {
    pub async fn execute(self, config_path: Option<&Path>) -> Result<bool> {
        match self {
            Self::Verify {
                base_url,
                username,
                password,
            } => {
                let mut settings = VerifyConfig::load(config_path)?;
                if let Some(base_url) = base_url {
                    settings.base_url = base_url;
                }
                if username.is_some() {
                    settings.username = username;
                }
                if password.is_some() {
                    settings.password = password;
                }
                verify(&settings).await
            }
            Self::Config { output } => {
                config::generate_default_config(&output)?;
                println!("Wrote default configuration to {}", output.display());
                Ok(true)
            }
        }
    }
}

async fn verify(settings: &VerifyConfig) -> Result<bool> {
    let (Some(username), Some(password)) = (&settings.username, &settings.password) else {
        bail!("credentials required: pass --username/--password or set PORPAGAR_USERNAME/PORPAGAR_PASSWORD");
    };

    let mut builder = TypedClientBuilder::new().base_url(&settings.base_url);
    if settings.request_timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(settings.request_timeout_secs));
    }
    let client = builder.build_public().context("failed to build HTTP client")?;

    info!(base_url = %client.base_url(), "verifying endpoints");
    println!("🔍 Verifying endpoints at: {}", client.base_url());
    println!("{}", "=".repeat(80));

    let report = Verifier::new(client).run(username, password).await;

    println!("\n{}\n", "=".repeat(80));
    print!("{report}");
    println!("\n{}", "=".repeat(80));

    Ok(report.is_success())
}
