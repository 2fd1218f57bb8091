//! mTLS configuration types.
//!
//! Defines the YAML-deserialisable configuration for mutual TLS: server
//! certificate paths, the CA bundle used as trust anchor, and chain limits.
//!
//! # Example YAML
//!
//! ```yaml
//! mtls:
//!   enabled: true
//!   server_cert: "/etc/blog-api/tls/server.crt"
//!   server_key:  "/etc/blog-api/tls/server.key"
//!   ca_cert:     "/etc/blog-api/tls/ca.crt"
//!   max_chain_depth: 8
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default upper bound on the length of a client certificate path.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 8;

/// Top-level mTLS configuration block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MtlsConfig {
    /// Serve over TLS and request client certificates.
    ///
    /// When `false` the API listens on plain HTTP.  Protected endpoints stay
    /// closed in that mode: no request carries peer data, so every write is
    /// denied with "Client certificate required".
    pub enabled: bool,

    /// Path to the PEM-encoded server certificate chain.
    pub server_cert: String,

    /// Path to the PEM-encoded server private key.
    pub server_key: String,

    /// Path to the PEM-encoded CA bundle that client certificates must
    /// chain to.  Required in every mode; loaded once at startup.
    pub ca_cert: String,

    /// Maximum number of certificates (leaf plus intermediates) in a path
    /// below a trust anchor.
    pub max_chain_depth: usize,
}

impl Default for MtlsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_cert: String::new(),
            server_key: String::new(),
            ca_cert: String::new(),
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }
}

impl MtlsConfig {
    /// Check that the paths needed for the selected mode are present.
    pub fn validate(&self) -> Result<()> {
        if self.ca_cert.trim().is_empty() {
            return Err(Error::Config(
                "mtls.ca_cert is required: protected endpoints need a trust anchor".to_string(),
            ));
        }
        if self.enabled {
            if self.server_cert.trim().is_empty() {
                return Err(Error::Config(
                    "mtls.server_cert is required when mtls.enabled is true".to_string(),
                ));
            }
            if self.server_key.trim().is_empty() {
                return Err(Error::Config(
                    "mtls.server_key is required when mtls.enabled is true".to_string(),
                ));
            }
        }
        if self.max_chain_depth == 0 {
            return Err(Error::Config(
                "mtls.max_chain_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
