//! Client settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML/YAML file, then `SHOPFRONT__`-prefixed environment variables
//! (`SHOPFRONT__API__BASE_URL`, `SHOPFRONT__DATA_DIR`, ...).

use crate::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the default data directory
pub const STATE_DIR_ENV: &str = "SHOPFRONT_STATE_DIR";

/// Top-level client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSettings {
    /// Remote API configuration
    pub api: ApiSettings,

    /// Directory holding persisted credentials and logs
    pub data_dir: PathBuf,
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Scheme and authority of the API, e.g. `https://shop.example.com`
    pub base_url: String,

    /// Path prefix prepended to every endpoint; differs between API revisions
    pub path_prefix: String,

    /// Request timeout in seconds (0 disables the client-side timeout)
    pub timeout_secs: u64,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            path_prefix: "/api".to_string(),
            timeout_secs: 30,
            user_agent: concat!("shopfront/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `$SHOPFRONT_STATE_DIR`, falling back to the platform data directory
pub fn default_data_dir() -> PathBuf {
    std::env::var_os(STATE_DIR_ENV).map_or_else(
        || {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("shopfront")
        },
        PathBuf::from,
    )
}

impl ClientSettings {
    /// Load settings from defaults, an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api.base_url", defaults.api.base_url)?
            .set_default("api.path_prefix", defaults.api.path_prefix)?
            .set_default("api.timeout_secs", defaults.api.timeout_secs)?
            .set_default("api.user_agent", defaults.api.user_agent)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(CoreError::invalid_config(format!(
                    "settings file {} does not exist",
                    path.display()
                )));
            }
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("SHOPFRONT").separator("__"))
            .build()?;

        let mut settings: Self = settings.try_deserialize()?;
        settings.validate()?;
        settings.api.path_prefix = normalize_prefix(&settings.api.path_prefix);
        Ok(settings)
    }

    fn validate(&self) -> CoreResult<()> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            CoreError::invalid_config(format!("api.base_url {:?}: {e}", self.api.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(CoreError::invalid_config(format!(
                "api.base_url must be http or https, got {}",
                url.scheme()
            )));
        }
        Ok(())
    }
}

/// `api/` and `/api/` both become `/api`; an empty prefix stays empty
pub fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
