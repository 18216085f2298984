//! CLI configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix, e.g. `PORPAGAR_BASE_URL`
pub const ENV_PREFIX: &str = "PORPAGAR";

/// Settings for a verification run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyConfig {
    /// Backend origin, without the `/api` suffix
    pub base_url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Per-request timeout; 0 disables it
    pub request_timeout_secs: u64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            username: None,
            password: None,
            request_timeout_secs: 10,
        }
    }
}

impl VerifyConfig {
    /// Load defaults, then the optional file, then `PORPAGAR_*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("failed to load configuration")?;

        Ok(settings.try_deserialize()?)
    }
}

/// Write a default configuration file
pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
    let content = toml::to_string_pretty(&VerifyConfig::default())?;
    std::fs::write(path.as_ref(), content)
        .with_context(|| format!("failed to write {}", path.as_ref().display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verify.toml");
        std::fs::write(
            &path,
            "base_url = \"https://porpagar.mx\"\nusername = \"MAURO\"\n",
        )
        .unwrap();

        let config = VerifyConfig::load(Some(&path)).unwrap();
        assert_eq!(config.base_url, "https://porpagar.mx");
        assert_eq!(config.username.as_deref(), Some("MAURO"));
        assert_eq!(config.password, None);
        assert_eq!(config.request_timeout_secs, 10);
    }

    #[test]
    fn generated_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verify.toml");
        generate_default_config(&path).unwrap();

        let config = VerifyConfig::load(Some(&path)).unwrap();
        assert_eq!(config.base_url, VerifyConfig::default().base_url);
        assert_eq!(config.request_timeout_secs, 10);
    }
}
