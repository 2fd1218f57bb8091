//! Peer certificate data handed over by the transport layer.
//!
//! The TLS acceptor collapses whatever the handshake produced into a
//! [`PeerData`] value once per connection; the authenticator never has to
//! guess at the shape of the input.

use std::sync::Arc;

use rustls::pki_types::CertificateDer;

/// Raw certificates presented by the peer of one connection.
///
/// Only [`PresentedCertificate::leaf`] is ever evaluated as the client's
/// identity.  The remaining certificates are path-building material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedCertificate {
    leaf: CertificateDer<'static>,
    intermediates: Vec<CertificateDer<'static>>,
}

impl PresentedCertificate {
    /// A leaf certificate with no accompanying chain.
    #[must_use]
    pub fn new(leaf: impl Into<CertificateDer<'static>>) -> Self {
        Self {
            leaf: leaf.into(),
            intermediates: Vec::new(),
        }
    }

    /// A leaf certificate followed by the chain the peer sent with it.
    #[must_use]
    pub fn with_intermediates(
        leaf: impl Into<CertificateDer<'static>>,
        intermediates: Vec<CertificateDer<'static>>,
    ) -> Self {
        Self {
            leaf: leaf.into(),
            intermediates,
        }
    }

    /// DER bytes of the leaf.
    #[must_use]
    pub fn leaf(&self) -> &[u8] {
        self.leaf.as_ref()
    }

    /// Additional certificates supplied alongside the leaf.
    #[must_use]
    pub fn intermediates(&self) -> &[CertificateDer<'static>] {
        &self.intermediates
    }
}

/// What the transport knows about the peer of a connection.
///
/// Cloned into every request on that connection, so the chain sits behind
/// an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PeerData {
    /// No transport-level peer information at all (e.g. plain HTTP).
    #[default]
    NoPeerData,
    /// A TLS peer, which may or may not have sent a certificate.
    PeerData {
        /// The presented certificate, if any.
        certificate: Option<Arc<PresentedCertificate>>,
    },
}

impl PeerData {
    /// Build peer data from the chain reported by a completed TLS handshake.
    ///
    /// `None` or an empty slice means the client sent no certificate.  The
    /// first entry is the leaf; the rest are intermediates.
    #[must_use]
    pub fn from_tls_chain(chain: Option<&[CertificateDer<'_>]>) -> Self {
        let certificate = chain
            .and_then(|certs| certs.split_first())
            .map(|(leaf, rest)| {
                Arc::new(PresentedCertificate::with_intermediates(
                    leaf.clone().into_owned(),
                    rest.iter().map(|c| c.clone().into_owned()).collect(),
                ))
            });
        Self::PeerData { certificate }
    }

    /// Peer data carrying a single presented certificate.
    #[must_use]
    pub fn presented(certificate: PresentedCertificate) -> Self {
        Self::PeerData {
            certificate: Some(Arc::new(certificate)),
        }
    }

    /// The presented certificate, if the peer sent one with non-empty bytes.
    #[must_use]
    pub fn certificate(&self) -> Option<&PresentedCertificate> {
        match self {
            Self::NoPeerData => None,
            Self::PeerData { certificate } => certificate
                .as_deref()
                .filter(|cert| !cert.leaf().is_empty()),
        }
    }
}
