//! Blog API Library
//!
//! JSON API for blog posts whose write endpoints are guarded by mutual TLS
//! client certificate authentication.
//!
//! # Features
//!
//! - **Posts API**: list, show, create, update and delete posts
//! - **Client certificates**: chain building against a configured CA bundle,
//!   validity window checks, audit identity of every accepted client
//! - **Deferred trust**: the TLS handshake only proves key possession, so a
//!   missing certificate and an untrusted one are reported separately
//! - **Tooling**: CLI helpers to mint a CA and client/server certificates

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod mtls;
pub mod posts;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        Some("json") => subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| Error::Internal(format!("Failed to install subscriber: {e}")))?,
        _ => subscriber
            .with(fmt::layer())
            .try_init()
            .map_err(|e| Error::Internal(format!("Failed to install subscriber: {e}")))?,
    }

    Ok(())
}
