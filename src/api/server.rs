//! API server

use std::net::SocketAddr;
use std::sync::Arc;

use axum_server::Handle;
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use super::router::{AppState, create_router};
use super::tls::PeerCertAcceptor;
use crate::config::Config;
use crate::mtls::{CertificateAuthenticator, TrustAnchor, build_tls_config};
use crate::posts::InMemoryPostStore;
use crate::{Error, Result};

/// Blog API server
pub struct ApiServer {
    /// Configuration
    config: Config,
    /// Trust anchor shared by the TLS layer and the authenticator
    anchor: Arc<TrustAnchor>,
    /// Shared application state
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new server.
    ///
    /// The CA bundle is loaded here; a missing or invalid bundle is fatal.
    pub fn new(config: Config) -> Result<Self> {
        let anchor = Arc::new(TrustAnchor::from_pem_file(&config.mtls.ca_cert)?);
        info!(
            path = %config.mtls.ca_cert,
            certificates = anchor.len(),
            "Loaded client CA bundle"
        );

        let authenticator = Arc::new(
            CertificateAuthenticator::new(Arc::clone(&anchor))
                .with_max_chain_depth(config.mtls.max_chain_depth),
        );
        let state = Arc::new(AppState {
            posts: Arc::new(InMemoryPostStore::new()),
            authenticator,
            posts_config: config.posts.clone(),
        });

        Ok(Self {
            config,
            anchor,
            state,
        })
    }

    /// Run until a shutdown signal arrives.
    pub async fn run(self) -> Result<()> {
        let addr = SocketAddr::new(
            self.config
                .server
                .host
                .parse()
                .map_err(|e| Error::Config(format!("Invalid host: {e}")))?,
            self.config.server.port,
        );

        let app = create_router(Arc::clone(&self.state), &self.config.server);

        info!("============================================================");
        info!("BLOG API v{}", env!("CARGO_PKG_VERSION"));
        info!("============================================================");

        if self.config.mtls.enabled {
            let tls = build_tls_config(&self.config.mtls, &self.anchor)?;
            let acceptor = PeerCertAcceptor::new(RustlsConfig::from_config(Arc::new(tls)));

            let handle = Handle::<SocketAddr>::new();
            let shutdown_handle = handle.clone();
            let grace = self.config.server.shutdown_timeout;
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(grace));
            });

            info!(%addr, "Listening (HTTPS, client certificates required for writes)");
            axum_server::bind(addr)
                .acceptor(acceptor)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        } else {
            let listener = TcpListener::bind(addr).await?;
            info!(%addr, "Listening (plain HTTP)");
            warn!("mTLS disabled - every write request will be rejected with 401");

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .map_err(|e| Error::Internal(e.to_string()))?;
        }

        info!("Server stopped");
        Ok(())
    }
}

/// Shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
