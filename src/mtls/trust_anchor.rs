//! Trust anchor: the CA certificates client certificates must chain to.
//!
//! Loaded once at startup and never mutated.  Every certificate in the
//! bundle is decoded at load time so that a broken bundle stops the process
//! instead of silently denying (or worse, admitting) traffic later.

use std::fs;

use rustls::pki_types::CertificateDer;
use tracing::{debug, info};
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

use crate::{Error, Result};

/// One anchor certificate with its subject DN pre-extracted.
#[derive(Debug, Clone)]
struct Anchor {
    der: CertificateDer<'static>,
    /// DER encoding of the subject `Name`, including the outer SEQUENCE.
    subject_raw: Vec<u8>,
    subject: String,
}

/// Immutable set of trusted CA certificates.
#[derive(Debug, Clone)]
pub struct TrustAnchor {
    anchors: Vec<Anchor>,
}

impl TrustAnchor {
    /// Load a PEM bundle from disk.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, contains no certificates, or any
    /// certificate in it cannot be decoded.
    pub fn from_pem_file(path: &str) -> Result<Self> {
        let pem = fs::read(path)
            .map_err(|e| Error::Config(format!("Cannot read CA bundle '{path}': {e}")))?;
        let anchor = Self::from_pem(&pem)
            .map_err(|e| Error::Config(format!("Invalid CA bundle '{path}': {e}")))?;
        info!(path = %path, anchors = anchor.len(), "Trust anchor loaded");
        Ok(anchor)
    }

    /// Parse a PEM bundle held in memory.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let certs = rustls_pemfile::certs(&mut &pem[..])
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::Config(format!("Failed to parse PEM certificates: {e}")))?;
        Self::from_der(certs)
    }

    /// Build an anchor from already decoded DER certificates.
    pub fn from_der(certs: Vec<CertificateDer<'static>>) -> Result<Self> {
        if certs.is_empty() {
            return Err(Error::Config("No CA certificates found".to_string()));
        }

        let anchors = certs
            .into_iter()
            .enumerate()
            .map(|(idx, der)| {
                let (rest, cert) = X509Certificate::from_der(der.as_ref()).map_err(|e| {
                    Error::Config(format!("CA certificate #{idx} is not valid X.509: {e}"))
                })?;
                if !rest.is_empty() {
                    return Err(Error::Config(format!(
                        "CA certificate #{idx} has trailing data"
                    )));
                }
                let subject_raw = cert.subject().as_raw().to_vec();
                let subject = cert.subject().to_string();
                debug!(index = idx, subject = %subject, "Added trust anchor");
                Ok(Anchor {
                    der: der.clone(),
                    subject_raw,
                    subject,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { anchors })
    }

    /// Number of anchor certificates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Always `false` for a successfully constructed anchor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Raw subject DNs, suitable as TLS certificate-request hints.
    pub fn subjects(&self) -> impl Iterator<Item = &[u8]> {
        self.anchors.iter().map(|a| a.subject_raw.as_slice())
    }

    /// Human-readable subject DNs.
    pub fn subject_names(&self) -> impl Iterator<Item = &str> {
        self.anchors.iter().map(|a| a.subject.as_str())
    }

    /// Whether `der` is byte-for-byte one of the anchor certificates.
    #[must_use]
    pub fn contains(&self, der: &[u8]) -> bool {
        self.anchors.iter().any(|a| a.der.as_ref() == der)
    }

    /// Anchor certificates whose subject equals the given raw issuer DN.
    pub(crate) fn issuers_of<'a>(
        &'a self,
        issuer_raw: &'a [u8],
    ) -> impl Iterator<Item = &'a [u8]> + 'a {
        self.anchors
            .iter()
            .filter(move |a| a.subject_raw == issuer_raw)
            .map(|a| a.der.as_ref())
    }
}
