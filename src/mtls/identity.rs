//! Certificate identity extraction.
//!
//! Pulls the audit-relevant fields out of an already decoded client
//! certificate: subject DN, Common Name, Organisational Unit, SAN URIs, SAN
//! DNS names and the SHA-256 fingerprint of the DER encoding.
//!
//! The identity is informational.  It is logged and handed to handlers, but
//! holding one is the only authorization check the API performs.

use serde::Serialize;
use sha2::{Digest, Sha256};
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;

/// Identity fields of a client certificate that passed verification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CertIdentity {
    /// Full subject distinguished name in RFC 4514 form.
    pub subject: String,

    /// Certificate Common Name (CN).
    pub common_name: Option<String>,

    /// First Organisational Unit (OU) in the subject.
    pub organizational_unit: Option<String>,

    /// Subject Alternative Name URI entries.
    pub san_uris: Vec<String>,

    /// Subject Alternative Name DNS entries.
    pub san_dns_names: Vec<String>,

    /// Lowercase hex SHA-256 of the certificate DER.
    pub fingerprint: String,

    /// Pre-computed human-readable label for logs.
    pub display_name: String,
}

impl CertIdentity {
    /// Extract identity fields from a parsed certificate and its DER bytes.
    #[must_use]
    pub fn from_certificate(cert: &X509Certificate<'_>, der: &[u8]) -> Self {
        let subject = cert.subject().to_string();
        let common_name = extract_cn(cert);
        let organizational_unit = extract_ou(cert);
        let (san_uris, san_dns_names) = extract_sans(cert);
        let display_name = build_display_name(common_name.as_ref(), &san_uris, &subject);

        Self {
            subject,
            common_name,
            organizational_unit,
            san_uris,
            san_dns_names,
            fingerprint: fingerprint(der),
            display_name,
        }
    }
}

fn extract_cn(cert: &X509Certificate<'_>) -> Option<String> {
    cert.subject()
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_owned)
}

fn extract_ou(cert: &X509Certificate<'_>) -> Option<String> {
    cert.subject()
        .iter_organizational_unit()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_owned)
}

/// SAN URI and SAN DNS entries; a malformed SAN extension yields none.
fn extract_sans(cert: &X509Certificate<'_>) -> (Vec<String>, Vec<String>) {
    let mut uris = Vec::new();
    let mut dns_names = Vec::new();

    if let Ok(Some(san_ext)) = cert.subject_alternative_name() {
        for name in &san_ext.value.general_names {
            match name {
                GeneralName::URI(uri) => uris.push((*uri).to_owned()),
                GeneralName::DNSName(dns) => dns_names.push((*dns).to_owned()),
                _ => {}
            }
        }
    }

    (uris, dns_names)
}

/// Prefers the CN, then the first SAN URI, then the whole subject DN.
fn build_display_name(cn: Option<&String>, san_uris: &[String], subject: &str) -> String {
    cn.or_else(|| san_uris.first())
        .map_or_else(
            || {
                if subject.is_empty() {
                    "<unknown>".to_owned()
                } else {
                    subject.to_owned()
                }
            },
            Clone::clone,
        )
}

fn fingerprint(der: &[u8]) -> String {
    hex::encode(Sha256::digest(der).as_slice())
}
