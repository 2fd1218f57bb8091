//! TLS acceptor that exposes the client's certificate chain to handlers
//!
//! Wraps the rustls acceptor and, once the handshake has finished, attaches
//! the connection's [`PeerData`] to every request served on it.

use std::io;

use axum_server::accept::Accept;
use axum_server::tls_rustls::{RustlsAcceptor, RustlsConfig};
use futures::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::server::TlsStream;
use tower_http::add_extension::AddExtension;
use tracing::debug;

use crate::mtls::PeerData;

/// Acceptor producing TLS streams whose services carry [`PeerData`].
#[derive(Clone)]
pub struct PeerCertAcceptor {
    inner: RustlsAcceptor,
}

impl PeerCertAcceptor {
    /// Create an acceptor for the given rustls configuration.
    pub fn new(config: RustlsConfig) -> Self {
        Self {
            inner: RustlsAcceptor::new(config),
        }
    }
}

impl<I, S> Accept<I, S> for PeerCertAcceptor
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    S: Send + 'static,
{
    type Stream = TlsStream<I>;
    type Service = AddExtension<S, PeerData>;
    type Future = BoxFuture<'static, io::Result<(Self::Stream, Self::Service)>>;

    fn accept(&self, stream: I, service: S) -> Self::Future {
        let acceptor = self.inner.clone();
        Box::pin(async move {
            let (stream, service) = acceptor.accept(stream, service).await?;
            let (_, connection) = stream.get_ref();
            let peer = PeerData::from_tls_chain(connection.peer_certificates());
            debug!(
                client_cert = peer.certificate().is_some(),
                alpn = ?connection.alpn_protocol().map(String::from_utf8_lossy),
                "TLS handshake complete"
            );
            Ok((stream, AddExtension::new(service, peer)))
        })
    }
}
