//! Configuration management

use std::{path::Path, time::Duration};

use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};

use crate::mtls::MtlsConfig;
use crate::{Error, Result};

/// Environment variable prefix; nested keys use `__` (e.g. `BLOG_API_MTLS__CA_CERT`).
pub const ENV_PREFIX: &str = "BLOG_API_";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,
    /// Mutual TLS configuration
    pub mtls: MtlsConfig,
    /// Posts API configuration
    pub posts: PostsConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// How long in-flight requests may drain after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
    /// Per-request timeout
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// Maximum request body size in bytes
    pub body_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4443,
            shutdown_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            body_limit: 1024 * 1024,
        }
    }
}

/// Posts API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostsConfig {
    /// Page size when the client does not ask for one
    pub default_page_size: usize,
    /// Upper bound on the page size a client may request
    pub max_page_size: usize,
}

impl Default for PostsConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    ///
    /// # Errors
    ///
    /// Returns an error if the config file does not exist, cannot be parsed,
    /// or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new();

        if let Some(p) = path {
            if !p.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            figment = figment.merge(Yaml::file(p));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        self.mtls.validate()?;
        if self.posts.default_page_size == 0 || self.posts.max_page_size == 0 {
            return Err(Error::Config("posts page sizes must be positive".to_string()));
        }
        if self.posts.default_page_size > self.posts.max_page_size {
            return Err(Error::Config(
                "posts.default_page_size cannot exceed posts.max_page_size".to_string(),
            ));
        }
        Ok(())
    }
}
