//! Mutual TLS client certificate authentication.
//!
//! Guards the write endpoints of the posts API.
//!
//! # Architecture
//!
//! ```text
//! TCP connection
//!   → TLS 1.3 handshake   (client cert requested, proof of possession checked)
//!   → PeerData attached to every request on the connection
//!   → CertificateAuthenticator::authenticate   (chain + validity, per request)
//!   → Allowed: CertIdentity into request extensions, handler runs
//!   → Denied:  401 with a generic message, reason in the audit log
//! ```
//!
//! # Modules
//!
//! - [`config`]: YAML configuration (`MtlsConfig`)
//! - [`trust_anchor`]: the CA bundle, loaded once (`TrustAnchor`)
//! - [`peer`]: transport-supplied peer data (`PeerData`, `PresentedCertificate`)
//! - [`authenticator`]: the decision core (`CertificateAuthenticator`)
//! - [`identity`]: audit identity of an accepted leaf (`CertIdentity`)
//! - [`cert_manager`]: rustls config building, PEM loading, certificate generation
//!
//! # Quick start
//!
//! ```yaml
//! mtls:
//!   enabled: true
//!   server_cert: "/etc/blog-api/tls/server.crt"
//!   server_key:  "/etc/blog-api/tls/server.key"
//!   ca_cert:     "/etc/blog-api/tls/ca.crt"
//! ```

pub mod authenticator;
pub mod cert_manager;
pub mod config;
pub mod identity;
pub mod peer;
pub mod trust_anchor;

pub use authenticator::{CertificateAuthenticator, DenialReason, VerificationOutcome};
pub use cert_manager::{
    CaParams, CertGenerator, GeneratedCert, LeafCertParams, LeafUsage, build_tls_config,
    load_certs, load_private_key,
};
pub use config::MtlsConfig;
pub use identity::CertIdentity;
pub use peer::{PeerData, PresentedCertificate};
pub use trust_anchor::TrustAnchor;
