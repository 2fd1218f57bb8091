//! Client certificate authentication.
//!
//! Turns the peer data of one request into a [`VerificationOutcome`].
//!
//! # Decision order
//!
//! 1. No certificate bytes → [`DenialReason::NoCertificatePresented`].
//! 2. Leaf is not one complete X.509 DER structure →
//!    [`DenialReason::MalformedCertificate`].
//! 3. The leaf is not itself an anchor certificate and there is no signature
//!    path from it to a [`TrustAnchor`] certificate, optionally through CA
//!    intermediates the peer sent along →
//!    [`DenialReason::UntrustedIssuer`].  This is checked before the validity
//!    window, so an untrusted certificate is reported as untrusted whatever
//!    its dates.
//! 4. `now < notBefore` → [`DenialReason::NotYetValid`];
//!    `now > notAfter` → [`DenialReason::Expired`].
//! 5. Otherwise [`VerificationOutcome::Allowed`].
//!
//! Every path returns an outcome; decoding and signature errors are folded
//! into a denial and never surface as `Err` or a panic.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use rustls::pki_types::CertificateDer;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

use super::config::DEFAULT_MAX_CHAIN_DEPTH;
use super::identity::CertIdentity;
use super::peer::PeerData;
use super::trust_anchor::TrustAnchor;

/// Why a client certificate was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// The caller made no authentication attempt.
    NoCertificatePresented,
    /// Bytes were presented but are not a well-formed certificate.
    MalformedCertificate,
    /// The certificate does not chain to the trust anchor.
    UntrustedIssuer,
    /// The leaf's `notAfter` is in the past.
    Expired,
    /// The leaf's `notBefore` is in the future.
    NotYetValid,
}

impl DenialReason {
    /// Stable code used in audit logs.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::NoCertificatePresented => "no_certificate_presented",
            Self::MalformedCertificate => "malformed_certificate",
            Self::UntrustedIssuer => "untrusted_issuer",
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Only "absent" and "invalid" are distinguished; the precise reason
    /// stays in the audit log.
    #[must_use]
    pub fn public_message(self) -> &'static str {
        match self {
            Self::NoCertificatePresented => "Client certificate required",
            _ => "Invalid client certificate",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The certificate chains to the anchor and is within its validity window.
    Allowed {
        /// Identity of the leaf, for audit purposes.
        subject_identity: CertIdentity,
    },
    /// The request must not reach a protected handler.
    Denied {
        /// Why.
        reason: DenialReason,
    },
}

impl VerificationOutcome {
    fn denied(reason: DenialReason) -> Self {
        Self::Denied { reason }
    }

    /// `true` for [`VerificationOutcome::Allowed`].
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    /// The denial reason, if denied.
    #[must_use]
    pub fn denial_reason(&self) -> Option<DenialReason> {
        match self {
            Self::Allowed { .. } => None,
            Self::Denied { reason } => Some(*reason),
        }
    }
}

/// Stateless verifier of client certificates against a [`TrustAnchor`].
///
/// Cheap to clone; the anchor is shared.
#[derive(Debug, Clone)]
pub struct CertificateAuthenticator {
    anchor: Arc<TrustAnchor>,
    max_chain_depth: usize,
}

impl CertificateAuthenticator {
    /// Create an authenticator with the default chain depth limit.
    #[must_use]
    pub fn new(anchor: Arc<TrustAnchor>) -> Self {
        Self {
            anchor,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    /// Override the maximum path length (leaf plus intermediates).
    #[must_use]
    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth.max(1);
        self
    }

    /// The anchor this authenticator verifies against.
    #[must_use]
    pub fn trust_anchor(&self) -> &TrustAnchor {
        &self.anchor
    }

    /// Authenticate against the current wall-clock time.
    #[must_use]
    pub fn authenticate(&self, peer: &PeerData) -> VerificationOutcome {
        self.authenticate_at(peer, OffsetDateTime::now_utc())
    }

    /// Authenticate as of `now`.
    #[must_use]
    pub fn authenticate_at(&self, peer: &PeerData, now: OffsetDateTime) -> VerificationOutcome {
        let outcome = self.evaluate(peer, now);
        audit(&outcome);
        outcome
    }

    fn evaluate(&self, peer: &PeerData, now: OffsetDateTime) -> VerificationOutcome {
        let Some(presented) = peer.certificate() else {
            return VerificationOutcome::denied(DenialReason::NoCertificatePresented);
        };

        let Some(leaf) = parse_complete(presented.leaf()) else {
            return VerificationOutcome::denied(DenialReason::MalformedCertificate);
        };

        let pinned = self.anchor.contains(presented.leaf());
        if !pinned {
            let intermediates = self.usable_intermediates(presented.intermediates());
            if !self.chains_to_anchor(&leaf, &intermediates) {
                return VerificationOutcome::denied(DenialReason::UntrustedIssuer);
            }
        }

        let now_ts = now.unix_timestamp();
        let validity = leaf.validity();
        if now_ts < validity.not_before.timestamp() {
            return VerificationOutcome::denied(DenialReason::NotYetValid);
        }
        if now_ts > validity.not_after.timestamp() {
            return VerificationOutcome::denied(DenialReason::Expired);
        }

        VerificationOutcome::Allowed {
            subject_identity: CertIdentity::from_certificate(&leaf, presented.leaf()),
        }
    }

    /// Decode the presented intermediates into path-building candidates.
    ///
    /// Intermediates are untrusted input: anything that does not decode or is
    /// not a CA is unusable.  Duplicates (same subject and key) are dropped and
    /// at most `max_chain_depth` candidates are kept.
    fn usable_intermediates<'a>(
        &self,
        presented: &'a [CertificateDer<'static>],
    ) -> Vec<X509Certificate<'a>> {
        let mut seen = HashSet::new();
        let mut usable = Vec::new();
        for der in presented {
            if usable.len() == self.max_chain_depth {
                debug!(
                    presented = presented.len(),
                    kept = usable.len(),
                    "Ignoring surplus intermediates"
                );
                break;
            }
            match parse_complete(der.as_ref()) {
                Some(cert) if cert.is_ca() => {
                    let key = (
                        cert.subject().as_raw().to_vec(),
                        cert.public_key().raw.to_vec(),
                    );
                    if seen.insert(key) {
                        usable.push(cert);
                    }
                }
                Some(cert) => debug!(subject = %cert.subject(), "Ignoring non-CA intermediate"),
                None => debug!("Ignoring undecodable intermediate"),
            }
        }
        usable
    }

    /// Breadth-first search for a signature path from `leaf` to an anchor.
    ///
    /// Level `n` holds certificates reachable with `n` certificates on the
    /// path, the leaf being level 1.  A candidate is expanded at most once, at
    /// its shortest distance, so the search costs O(n²) signature checks.
    fn chains_to_anchor<'a>(
        &self,
        leaf: &'a X509Certificate<'a>,
        intermediates: &'a [X509Certificate<'a>],
    ) -> bool {
        let mut visited = vec![false; intermediates.len()];
        let mut level: Vec<&'a X509Certificate<'a>> = vec![leaf];

        for depth in 1..=self.max_chain_depth {
            if level.iter().any(|cert| self.signed_by_anchor(cert)) {
                return true;
            }
            if depth == self.max_chain_depth {
                break;
            }

            let mut next = Vec::new();
            for cert in &level {
                let issuer_raw = cert.issuer().as_raw();
                for (idx, candidate) in intermediates.iter().enumerate() {
                    if visited[idx] || candidate.subject().as_raw() != issuer_raw {
                        continue;
                    }
                    if cert.verify_signature(Some(candidate.public_key())).is_ok() {
                        visited[idx] = true;
                        next.push(candidate);
                    }
                }
            }
            if next.is_empty() {
                return false;
            }
            level = next;
        }

        false
    }

    fn signed_by_anchor(&self, cert: &X509Certificate<'_>) -> bool {
        self.anchor
            .issuers_of(cert.issuer().as_raw())
            .any(|anchor_der| {
                X509Certificate::from_der(anchor_der).is_ok_and(|(_, anchor)| {
                    cert.verify_signature(Some(anchor.public_key())).is_ok()
                })
            })
    }
}

/// Decode exactly one certificate; trailing bytes make the input malformed.
fn parse_complete(der: &[u8]) -> Option<X509Certificate<'_>> {
    match X509Certificate::from_der(der) {
        Ok((rest, cert)) if rest.is_empty() => Some(cert),
        _ => None,
    }
}

fn audit(outcome: &VerificationOutcome) {
    match outcome {
        VerificationOutcome::Allowed { subject_identity } => info!(
            event = "client_cert.allowed",
            subject = %subject_identity.subject,
            fingerprint = %subject_identity.fingerprint,
            "Client certificate accepted"
        ),
        VerificationOutcome::Denied {
            reason: DenialReason::NoCertificatePresented,
        } => debug!(
            event = "client_cert.denied",
            reason = DenialReason::NoCertificatePresented.code(),
            "No client certificate presented"
        ),
        VerificationOutcome::Denied { reason } => warn!(
            event = "client_cert.denied",
            reason = reason.code(),
            "Client certificate rejected"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtls::peer::PresentedCertificate;
    use rcgen::{
        BasicConstraints, Certificate, CertificateParams, DnType, IsCa, Issuer, KeyPair,
        date_time_ymd,
    };
    use rustls::pki_types::CertificateDer;

    // ── helpers ──────────────────────────────────────────────────────────────

    struct TestCa {
        params: CertificateParams,
        key: KeyPair,
        cert: Certificate,
    }

    impl TestCa {
        fn root(cn: &str) -> Self {
            let params = ca_params(cn);
            let key = KeyPair::generate().unwrap();
            let cert = params.self_signed(&key).unwrap();
            Self { params, key, cert }
        }

        fn intermediate(&self, cn: &str) -> Self {
            let params = ca_params(cn);
            let key = KeyPair::generate().unwrap();
            let cert = params.signed_by(&key, &self.issuer()).unwrap();
            Self { params, key, cert }
        }

        fn issuer(&self) -> Issuer<'_, &KeyPair> {
            Issuer::from_params(&self.params, &self.key)
        }

        fn issue(&self, params: &CertificateParams) -> Vec<u8> {
            let key = KeyPair::generate().unwrap();
            params.signed_by(&key, &self.issuer()).unwrap().der().to_vec()
        }

        fn der(&self) -> CertificateDer<'static> {
            self.cert.der().clone()
        }

        fn anchor(&self) -> Arc<TrustAnchor> {
            Arc::new(TrustAnchor::from_der(vec![self.der()]).unwrap())
        }
    }

    fn ca_params(cn: &str) -> CertificateParams {
        let mut params = CertificateParams::default();
        params.distinguished_name.push(DnType::CommonName, cn);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params
    }

    fn leaf_params(cn: &str) -> CertificateParams {
        let mut params = CertificateParams::default();
        params.distinguished_name.push(DnType::CommonName, cn);
        params.not_before = date_time_ymd(2020, 1, 1);
        params.not_after = date_time_ymd(2040, 1, 1);
        params
    }

    fn at(year: i32) -> OffsetDateTime {
        date_time_ymd(year, 6, 1)
    }

    fn peer(leaf: Vec<u8>) -> PeerData {
        PeerData::presented(PresentedCertificate::new(leaf))
    }

    fn self_signed(params: &CertificateParams) -> Vec<u8> {
        let key = KeyPair::generate().unwrap();
        params.self_signed(&key).unwrap().der().to_vec()
    }

    // ── absent / malformed ───────────────────────────────────────────────────

    #[test]
    fn no_peer_data_is_no_certificate_presented() {
        let ca = TestCa::root("Blog Root CA");
        let auth = CertificateAuthenticator::new(ca.anchor());

        let outcome = auth.authenticate(&PeerData::NoPeerData);
        assert_eq!(
            outcome.denial_reason(),
            Some(DenialReason::NoCertificatePresented)
        );

        let outcome = auth.authenticate(&PeerData::from_tls_chain(None));
        assert_eq!(
            outcome.denial_reason(),
            Some(DenialReason::NoCertificatePresented)
        );
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let ca = TestCa::root("Blog Root CA");
        let auth = CertificateAuthenticator::new(ca.anchor());

        for input in [
            b"not a certificate".to_vec(),
            vec![0x30],
            vec![0x30, 0x82, 0xff, 0xff, 0x00],
            vec![0u8; 64],
        ] {
            let outcome = auth.authenticate(&peer(input));
            assert_eq!(
                outcome.denial_reason(),
                Some(DenialReason::MalformedCertificate)
            );
        }
    }

    #[test]
    fn truncated_certificate_is_malformed() {
        // GIVEN: a valid leaf cut in half
        let ca = TestCa::root("Blog Root CA");
        let mut der = ca.issue(&leaf_params("publisher"));
        der.truncate(der.len() / 2);
        // WHEN / THEN
        let outcome = CertificateAuthenticator::new(ca.anchor()).authenticate_at(&peer(der), at(2030));
        assert_eq!(
            outcome.denial_reason(),
            Some(DenialReason::MalformedCertificate)
        );
    }

    #[test]
    fn trailing_bytes_after_certificate_are_malformed() {
        let ca = TestCa::root("Blog Root CA");
        let mut der = ca.issue(&leaf_params("publisher"));
        der.extend_from_slice(b"\x00\x01");
        let outcome = CertificateAuthenticator::new(ca.anchor()).authenticate_at(&peer(der), at(2030));
        assert_eq!(
            outcome.denial_reason(),
            Some(DenialReason::MalformedCertificate)
        );
    }

    // ── chain validation ─────────────────────────────────────────────────────

    #[test]
    fn leaf_issued_by_anchor_is_allowed() {
        // GIVEN: a leaf signed directly by the trusted root
        let ca = TestCa::root("Blog Root CA");
        let der = ca.issue(&leaf_params("publisher-bot"));
        // WHEN: authenticating inside the validity window
        let outcome = CertificateAuthenticator::new(ca.anchor()).authenticate_at(&peer(der), at(2030));
        // THEN: allowed with the leaf's identity
        match outcome {
            VerificationOutcome::Allowed { subject_identity } => {
                assert_eq!(subject_identity.common_name.as_deref(), Some("publisher-bot"));
            }
            other => panic!("expected Allowed, got {other:?}"),
        }
    }

    #[test]
    fn self_signed_certificate_is_untrusted() {
        let ca = TestCa::root("Blog Root CA");
        let der = self_signed(&leaf_params("intruder"));
        let outcome = CertificateAuthenticator::new(ca.anchor()).authenticate_at(&peer(der), at(2030));
        assert_eq!(outcome.denial_reason(), Some(DenialReason::UntrustedIssuer));
    }

    #[test]
    fn untrusted_issuer_wins_over_validity_window() {
        // GIVEN: a leaf from a foreign CA that is also expired
        let trusted = TestCa::root("Blog Root CA");
        let foreign = TestCa::root("Foreign CA");
        let mut params = leaf_params("expired-and-foreign");
        params.not_before = date_time_ymd(2001, 1, 1);
        params.not_after = date_time_ymd(2002, 1, 1);
        let der = foreign.issue(&params);
        // THEN: reported as untrusted, not expired
        let outcome =
            CertificateAuthenticator::new(trusted.anchor()).authenticate_at(&peer(der), at(2030));
        assert_eq!(outcome.denial_reason(), Some(DenialReason::UntrustedIssuer));
    }

    #[test]
    fn issuer_name_collision_without_matching_key_is_untrusted() {
        // GIVEN: an attacker CA that copies the trusted root's name
        let trusted = TestCa::root("Blog Root CA");
        let impostor = TestCa::root("Blog Root CA");
        let der = impostor.issue(&leaf_params("impostor"));
        // THEN: the signature does not verify under the real anchor key
        let outcome =
            CertificateAuthenticator::new(trusted.anchor()).authenticate_at(&peer(der), at(2030));
        assert_eq!(outcome.denial_reason(), Some(DenialReason::UntrustedIssuer));
    }

    #[test]
    fn supplied_intermediate_completes_the_chain() {
        // GIVEN: root → intermediate → leaf
        let root = TestCa::root("Blog Root CA");
        let intermediate = root.intermediate("Blog Issuing CA");
        let leaf = intermediate.issue(&leaf_params("importer"));
        let auth = CertificateAuthenticator::new(root.anchor());

        // WHEN: the peer sends the intermediate along
        let with_chain = PeerData::presented(PresentedCertificate::with_intermediates(
            leaf.clone(),
            vec![intermediate.der()],
        ));
        // THEN: allowed
        assert!(auth.authenticate_at(&with_chain, at(2030)).is_allowed());

        // AND: the bare leaf cannot be anchored
        assert_eq!(
            auth.authenticate_at(&peer(leaf), at(2030)).denial_reason(),
            Some(DenialReason::UntrustedIssuer)
        );
    }

    #[test]
    fn intermediate_in_the_anchor_set_is_enough() {
        let root = TestCa::root("Blog Root CA");
        let intermediate = root.intermediate("Blog Issuing CA");
        let leaf = intermediate.issue(&leaf_params("importer"));
        let outcome = CertificateAuthenticator::new(intermediate.anchor())
            .authenticate_at(&peer(leaf), at(2030));
        assert!(outcome.is_allowed());
    }

    #[test]
    fn non_ca_intermediate_cannot_issue() {
        // GIVEN: a leaf signed by another *leaf* that chains to the root
        let root = TestCa::root("Blog Root CA");
        let middle_params = leaf_params("not-a-ca");
        let middle_key = KeyPair::generate().unwrap();
        let middle = middle_params.signed_by(&middle_key, &root.issuer()).unwrap();
        let middle_issuer = Issuer::from_params(&middle_params, &middle_key);
        let leaf_key = KeyPair::generate().unwrap();
        let leaf = leaf_params("sneaky")
            .signed_by(&leaf_key, &middle_issuer)
            .unwrap()
            .der()
            .to_vec();
        // WHEN: presenting the non-CA as intermediate
        let peer_data = PeerData::presented(PresentedCertificate::with_intermediates(
            leaf,
            vec![middle.der().clone()],
        ));
        // THEN: no path
        let outcome = CertificateAuthenticator::new(root.anchor()).authenticate_at(&peer_data, at(2030));
        assert_eq!(outcome.denial_reason(), Some(DenialReason::UntrustedIssuer));
    }

    #[test]
    fn chain_longer_than_depth_limit_is_untrusted() {
        let root = TestCa::root("Blog Root CA");
        let first = root.intermediate("Tier 1");
        let second = first.intermediate("Tier 2");
        let leaf = second.issue(&leaf_params("deep"));
        let peer_data = PeerData::presented(PresentedCertificate::with_intermediates(
            leaf,
            vec![second.der(), first.der()],
        ));

        let auth = CertificateAuthenticator::new(root.anchor());
        assert!(auth.authenticate_at(&peer_data, at(2030)).is_allowed());

        let shallow = auth.clone().with_max_chain_depth(2);
        assert_eq!(
            shallow.authenticate_at(&peer_data, at(2030)).denial_reason(),
            Some(DenialReason::UntrustedIssuer)
        );
    }

    #[test]
    fn undecodable_intermediates_are_ignored() {
        let root = TestCa::root("Blog Root CA");
        let leaf = root.issue(&leaf_params("publisher"));
        let peer_data = PeerData::presented(PresentedCertificate::with_intermediates(
            leaf,
            vec![CertificateDer::from(b"junk".to_vec())],
        ));
        let outcome = CertificateAuthenticator::new(root.anchor()).authenticate_at(&peer_data, at(2030));
        assert!(outcome.is_allowed());
    }

    #[test]
    fn pinned_self_signed_certificate_in_anchor_is_allowed() {
        // GIVEN: an operator trusts one self-signed client cert directly
        let params = leaf_params("pinned-client");
        let der = self_signed(&params);
        let anchor = Arc::new(TrustAnchor::from_der(vec![CertificateDer::from(der.clone())]).unwrap());
        // THEN: it anchors to itself
        let outcome = CertificateAuthenticator::new(anchor).authenticate_at(&peer(der), at(2030));
        assert!(outcome.is_allowed());
    }

    #[test]
    fn anchor_certificate_presented_as_leaf_is_allowed() {
        // GIVEN: only the issuing CA (itself signed by an untrusted root) is trusted
        let root = TestCa::root("Blog Root CA");
        let issuing = root.intermediate("Blog Issuing CA");
        let auth = CertificateAuthenticator::new(issuing.anchor());

        // WHEN: that exact certificate is presented as the client leaf
        let outcome = auth.authenticate_at(&peer(issuing.der().to_vec()), at(2030));

        // THEN: it is trusted directly, without a path to its issuer
        assert!(outcome.is_allowed(), "{outcome:?}");
    }

    #[test]
    fn same_named_intermediates_sharing_a_key_fail_fast() {
        use std::time::{Duration, Instant};

        // GIVEN: many self-issued CA certificates named "Evil" on one key, each
        // a valid issuer of every other, and a leaf signed by that key
        let trusted = TestCa::root("Blog Root CA");
        let evil_params = ca_params("Evil");
        let evil_key = KeyPair::generate().unwrap();
        let evil: Vec<CertificateDer<'static>> = (0..12)
            .map(|_| evil_params.self_signed(&evil_key).unwrap().der().clone())
            .collect();
        let leaf = leaf_params("mallory")
            .signed_by(
                &KeyPair::generate().unwrap(),
                &Issuer::from_params(&evil_params, &evil_key),
            )
            .unwrap()
            .der()
            .to_vec();
        let peer_data =
            PeerData::presented(PresentedCertificate::with_intermediates(leaf, evil));
        let auth = CertificateAuthenticator::new(trusted.anchor()).with_max_chain_depth(16);

        // WHEN: authenticating against an unrelated root
        let started = Instant::now();
        let outcome = auth.authenticate_at(&peer_data, at(2030));

        // THEN: untrusted, without exploring every ordering of the chain
        assert_eq!(outcome.denial_reason(), Some(DenialReason::UntrustedIssuer));
        assert!(started.elapsed() < Duration::from_secs(2), "{:?}", started.elapsed());
    }

    #[test]
    fn intermediates_beyond_the_depth_limit_are_not_considered() {
        // GIVEN: eight unrelated CA certificates sent ahead of the real issuer
        let root = TestCa::root("Blog Root CA");
        let issuing = root.intermediate("Blog Issuing CA");
        let leaf = issuing.issue(&leaf_params("importer"));
        let mut chain: Vec<CertificateDer<'static>> = (0..DEFAULT_MAX_CHAIN_DEPTH)
            .map(|n| TestCa::root(&format!("Filler {n}")).der())
            .collect();
        chain.push(issuing.der());
        let auth = CertificateAuthenticator::new(root.anchor());

        // WHEN / THEN: the real issuer falls past the candidate limit
        let padded = PeerData::presented(PresentedCertificate::with_intermediates(
            leaf.clone(),
            chain,
        ));
        assert_eq!(
            auth.authenticate_at(&padded, at(2030)).denial_reason(),
            Some(DenialReason::UntrustedIssuer)
        );

        // AND: sent on its own it still completes the chain
        let tidy = PeerData::presented(PresentedCertificate::with_intermediates(
            leaf,
            vec![issuing.der()],
        ));
        assert!(auth.authenticate_at(&tidy, at(2030)).is_allowed());
    }

    // ── validity window ──────────────────────────────────────────────────────

    #[test]
    fn expired_leaf_is_expired() {
        let ca = TestCa::root("Blog Root CA");
        let der = ca.issue(&leaf_params("publisher"));
        let outcome = CertificateAuthenticator::new(ca.anchor()).authenticate_at(&peer(der), at(2045));
        assert_eq!(outcome.denial_reason(), Some(DenialReason::Expired));
    }

    #[test]
    fn future_leaf_is_not_yet_valid() {
        let ca = TestCa::root("Blog Root CA");
        let der = ca.issue(&leaf_params("publisher"));
        let outcome = CertificateAuthenticator::new(ca.anchor()).authenticate_at(&peer(der), at(2015));
        assert_eq!(outcome.denial_reason(), Some(DenialReason::NotYetValid));
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        let ca = TestCa::root("Blog Root CA");
        let der = ca.issue(&leaf_params("publisher"));
        let auth = CertificateAuthenticator::new(ca.anchor());
        assert!(auth.authenticate_at(&peer(der.clone()), date_time_ymd(2020, 1, 1)).is_allowed());
        assert!(auth.authenticate_at(&peer(der), date_time_ymd(2040, 1, 1)).is_allowed());
    }

    // ── purity ───────────────────────────────────────────────────────────────

    #[test]
    fn identical_inputs_yield_identical_outcomes() {
        let ca = TestCa::root("Blog Root CA");
        let auth = CertificateAuthenticator::new(ca.anchor());
        let good = peer(ca.issue(&leaf_params("publisher")));
        let bad = peer(self_signed(&leaf_params("intruder")));

        assert_eq!(auth.authenticate_at(&good, at(2030)), auth.authenticate_at(&good, at(2030)));
        assert_eq!(auth.authenticate_at(&bad, at(2030)), auth.authenticate_at(&bad, at(2030)));
    }

    #[test]
    fn reason_codes_and_public_messages() {
        assert_eq!(DenialReason::UntrustedIssuer.to_string(), "untrusted_issuer");
        assert_eq!(
            DenialReason::NoCertificatePresented.public_message(),
            "Client certificate required"
        );
        for reason in [
            DenialReason::MalformedCertificate,
            DenialReason::UntrustedIssuer,
            DenialReason::Expired,
            DenialReason::NotYetValid,
        ] {
            assert_eq!(reason.public_message(), "Invalid client certificate");
        }
    }
}
