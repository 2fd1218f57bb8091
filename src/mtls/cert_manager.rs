//! Certificate management: PEM loading, rustls config building, and the
//! `rcgen`-backed generators behind the `blog-api tls` commands.
//!
//! # File format
//!
//! All certificate and key files are **PEM**.  openssl, cfssl and
//! cert-manager all default to it.
//!
//! # Handshake vs. request-level trust
//!
//! The TLS layer asks for a client certificate but does not make the trust
//! decision.  It only checks that the client holds the private key for the
//! certificate it sent.  Chain and validity checks happen per request in
//! [`crate::mtls::CertificateAuthenticator`], which is what lets the API
//! answer "certificate required" and "invalid certificate" differently
//! instead of failing the handshake for both.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose,
    IsCa, Issuer, KeyPair, KeyUsagePurpose, SanType, date_time_ymd, string::Ia5String,
};
use rustls::client::danger::HandshakeSignatureValid;
use rustls::crypto::{WebPkiSupportedAlgorithms, verify_tls12_signature, verify_tls13_signature};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, UnixTime};
use rustls::server::danger::{ClientCertVerified, ClientCertVerifier};
use rustls::{DigitallySignedStruct, DistinguishedName as TlsDistinguishedName, ServerConfig, SignatureScheme};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::mtls::config::MtlsConfig;
use crate::mtls::trust_anchor::TrustAnchor;
use crate::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Public: build TLS server config
// ─────────────────────────────────────────────────────────────────────────────

/// Build the `rustls::ServerConfig` for the API listener.
///
/// TLS 1.3 only, ALPN `h2` then `http/1.1`.  Client certificates are
/// requested (with the anchor subjects as hints) but optional.
///
/// # Errors
///
/// Returns an error if the server certificate or key cannot be read or
/// parsed, or if rustls rejects the pair.
pub fn build_tls_config(config: &MtlsConfig, anchor: &TrustAnchor) -> Result<ServerConfig> {
    let server_certs = load_certs(&config.server_cert)?;
    let server_key = load_private_key(&config.server_key)?;

    let provider = Arc::new(rustls::crypto::aws_lc_rs::default_provider());
    let verifier = Arc::new(DeferredClientVerifier::new(
        anchor,
        provider.signature_verification_algorithms,
    ));

    let mut tls_cfg = ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(&[&rustls::version::TLS13])
        .map_err(|e| Error::Tls(format!("Unsupported TLS protocol configuration: {e}")))?
        .with_client_cert_verifier(verifier)
        .with_single_cert(server_certs, server_key)
        .map_err(|e| Error::Tls(format!("TLS config error (cert/key mismatch?): {e}")))?;

    tls_cfg.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    debug!(
        server_cert = %config.server_cert,
        ca_cert = %config.ca_cert,
        anchors = anchor.len(),
        "mTLS config built"
    );

    Ok(tls_cfg)
}

/// Requests a client certificate and checks proof of possession only.
#[derive(Debug)]
struct DeferredClientVerifier {
    root_hints: Vec<TlsDistinguishedName>,
    algorithms: WebPkiSupportedAlgorithms,
}

impl DeferredClientVerifier {
    fn new(anchor: &TrustAnchor, algorithms: WebPkiSupportedAlgorithms) -> Self {
        let root_hints = anchor
            .subjects()
            .map(|raw| TlsDistinguishedName::from(raw.to_vec()))
            .collect();
        Self {
            root_hints,
            algorithms,
        }
    }
}

impl ClientCertVerifier for DeferredClientVerifier {
    fn offer_client_auth(&self) -> bool {
        true
    }

    fn client_auth_mandatory(&self) -> bool {
        false
    }

    fn root_hint_subjects(&self) -> &[TlsDistinguishedName] {
        &self.root_hints
    }

    fn verify_client_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _now: UnixTime,
    ) -> std::result::Result<ClientCertVerified, rustls::Error> {
        // Chain and validity are judged per request by the authenticator.
        Ok(ClientCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(message, cert, dss, &self.algorithms)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(message, cert, dss, &self.algorithms)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.algorithms.supported_schemes()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public: PEM loading
// ─────────────────────────────────────────────────────────────────────────────

/// Load all certificates from a PEM file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains no valid PEM
/// certificate blocks.
pub fn load_certs(path: &str) -> Result<Vec<CertificateDer<'static>>> {
    let pem_data = read_file(path)?;
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut pem_data.as_slice())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Config(format!("Failed to parse certs from '{path}': {e}")))?;

    if certs.is_empty() {
        return Err(Error::Config(format!("No certificates found in '{path}'")));
    }

    Ok(certs)
}

/// Load the first private key (PKCS#8, PKCS#1 or SEC1) from a PEM file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains no private key.
pub fn load_private_key(path: &str) -> Result<PrivateKeyDer<'static>> {
    let pem_data = read_file(path)?;
    rustls_pemfile::private_key(&mut pem_data.as_slice())
        .map_err(|e| Error::Config(format!("Failed to parse private key from '{path}': {e}")))?
        .ok_or_else(|| Error::Config(format!("No private key found in '{path}'")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Public: certificate generation (CLI helpers)
// ─────────────────────────────────────────────────────────────────────────────

/// Parameters for generating a CA certificate.
#[derive(Debug)]
pub struct CaParams<'a> {
    /// Common Name for the root CA (e.g. `"Blog API Client CA"`).
    pub cn: &'a str,
    /// Validity period in days.
    pub validity_days: u32,
}

/// What a leaf certificate will be presented for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafUsage {
    /// A TLS client (API caller).
    Client,
    /// A TLS server (the API listener).
    Server,
}

/// Parameters for generating a leaf certificate.
#[derive(Debug)]
pub struct LeafCertParams<'a> {
    /// Common Name.
    pub cn: &'a str,
    /// Organisational Unit (optional).
    pub ou: Option<&'a str>,
    /// Subject Alternative Names: DNS entries.
    pub san_dns: Vec<String>,
    /// Subject Alternative Names: URI entries.
    pub san_uris: Vec<String>,
    /// Validity period in days.
    pub validity_days: u32,
    /// Extended key usage to stamp on the certificate.
    pub usage: LeafUsage,
}

/// Generated certificate and key pair in PEM format.
#[derive(Debug)]
pub struct GeneratedCert {
    /// PEM-encoded certificate.
    pub cert_pem: String,
    /// PEM-encoded private key.
    pub key_pem: String,
}

/// Certificate generator backed by `rcgen`.
pub struct CertGenerator;

impl CertGenerator {
    /// Generate a self-signed CA certificate.
    ///
    /// # Errors
    ///
    /// Returns an error if key generation or certificate serialisation fails.
    pub fn init_ca(params: &CaParams<'_>) -> Result<GeneratedCert> {
        let key_pair = KeyPair::generate()
            .map_err(|e| Error::Config(format!("Failed to generate CA key: {e}")))?;

        let mut ca_params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, params.cn);
        ca_params.distinguished_name = dn;
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        ca_params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
        let (not_before, not_after) = validity_window(params.validity_days)?;
        ca_params.not_before = not_before;
        ca_params.not_after = not_after;

        let ca_cert = ca_params
            .self_signed(&key_pair)
            .map_err(|e| Error::Config(format!("CA cert generation failed: {e}")))?;

        Ok(GeneratedCert {
            cert_pem: ca_cert.pem(),
            key_pem: key_pair.serialize_pem(),
        })
    }

    /// Issue a leaf certificate signed by `ca_cert_pem` / `ca_key_pem`.
    ///
    /// # Errors
    ///
    /// Returns an error if the CA cert/key cannot be parsed, a SAN is not a
    /// valid IA5 string, or signing fails.
    pub fn issue_leaf(
        params: &LeafCertParams<'_>,
        ca_cert_pem: &str,
        ca_key_pem: &str,
    ) -> Result<GeneratedCert> {
        let ca_key = KeyPair::from_pem(ca_key_pem)
            .map_err(|e| Error::Config(format!("Failed to parse CA key: {e}")))?;
        let issuer = Issuer::from_ca_cert_pem(ca_cert_pem, ca_key)
            .map_err(|e| Error::Config(format!("Failed to parse CA cert: {e}")))?;

        let leaf_key = KeyPair::generate()
            .map_err(|e| Error::Config(format!("Failed to generate leaf key: {e}")))?;

        let mut leaf_params = CertificateParams::default();
        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, params.cn);
        if let Some(ou) = params.ou {
            dn.push(DnType::OrganizationalUnitName, ou);
        }
        leaf_params.distinguished_name = dn;
        let (not_before, not_after) = validity_window(params.validity_days)?;
        leaf_params.not_before = not_before;
        leaf_params.not_after = not_after;
        leaf_params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
        leaf_params.extended_key_usages = vec![match params.usage {
            LeafUsage::Client => ExtendedKeyUsagePurpose::ClientAuth,
            LeafUsage::Server => ExtendedKeyUsagePurpose::ServerAuth,
        }];

        let mut sans: Vec<SanType> = Vec::new();
        for dns in &params.san_dns {
            let ia5 = Ia5String::try_from(dns.as_str())
                .map_err(|e| Error::Config(format!("Invalid DNS SAN '{dns}': {e}")))?;
            sans.push(SanType::DnsName(ia5));
        }
        for uri in &params.san_uris {
            let ia5 = Ia5String::try_from(uri.as_str())
                .map_err(|e| Error::Config(format!("Invalid URI SAN '{uri}': {e}")))?;
            sans.push(SanType::URI(ia5));
        }
        leaf_params.subject_alt_names = sans;

        let leaf_cert = leaf_params
            .signed_by(&leaf_key, &issuer)
            .map_err(|e| Error::Config(format!("Leaf cert signing failed: {e}")))?;

        Ok(GeneratedCert {
            cert_pem: leaf_cert.pem(),
            key_pem: leaf_key.serialize_pem(),
        })
    }

    /// Write `<stem>.crt` and `<stem>.key` under `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the files
    /// cannot be written.
    pub fn write_to_dir(cert: &GeneratedCert, dir: &Path, stem: &str) -> Result<()> {
        fs::create_dir_all(dir)
            .map_err(|e| Error::Config(format!("Cannot create dir '{}': {e}", dir.display())))?;

        fs::write(dir.join(format!("{stem}.crt")), &cert.cert_pem)
            .map_err(|e| Error::Config(format!("Cannot write cert: {e}")))?;

        fs::write(dir.join(format!("{stem}.key")), &cert.key_pem)
            .map_err(|e| Error::Config(format!("Cannot write key: {e}")))?;

        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Private helpers
// ─────────────────────────────────────────────────────────────────────────────

fn read_file(path: &str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::Config(format!("Cannot read '{path}': {e}")))
}

/// Midnight today until midnight `days` from now, both UTC.
fn validity_window(days: u32) -> Result<(OffsetDateTime, OffsetDateTime)> {
    let today = OffsetDateTime::now_utc();
    let until = today
        .checked_add(Duration::days(i64::from(days)))
        .ok_or_else(|| Error::Config(format!("Validity of {days} days is out of range")))?;
    Ok((midnight(today), midnight(until)))
}

fn midnight(dt: OffsetDateTime) -> OffsetDateTime {
    date_time_ymd(dt.year(), u8::from(dt.month()), dt.day())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
