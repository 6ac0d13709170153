//! Dashboard configuration.
//!
//! The only setting is the backend base URL. Values are layered: built-in
//! default, then an optional TOML file, then `BUTAMAN_*` environment
//! variables. The CLI applies `--url` on top.
//!
//! ```toml
//! base_url = "http://butaman-backend:8080"
//! ```

use std::path::Path;

use anyhow::{bail, Result};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::sync::STATE_PATH;

/// Backend address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Config file read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "butaman.toml";

/// Prefix for environment overrides (`BUTAMAN_BASE_URL`).
pub const ENV_PREFIX: &str = "BUTAMAN";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DashboardConfig {
    pub base_url: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Load from `path` (or [`DEFAULT_CONFIG_FILE`] if present) and the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, Environment::with_prefix(ENV_PREFIX))
    }

    /// Load with an explicit environment source.
    pub fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };

        let config = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .add_source(file)
            .add_source(env)
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validated()
    }

    /// Replace the base URL, re-validating it.
    pub fn with_base_url(self, base_url: &str) -> Result<Self> {
        Self {
            base_url: base_url.to_string(),
        }
        .validated()
    }

    /// Full URL of the state resource.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, STATE_PATH)
    }

    fn validated(mut self) -> Result<Self> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            bail!("base_url must not be empty");
        }
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            bail!("base_url must start with http:// or https://, got {:?}", trimmed);
        }
        self.base_url = trimmed.to_string();
        Ok(self)
    }
}
