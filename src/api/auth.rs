//! Client certificate middleware for protected routes
//!
//! Runs the [`CertificateAuthenticator`] on every request routed through it:
//! - Allowed: the [`CertIdentity`] is injected into request extensions
//! - Denied: 401 with a generic message; the precise reason is only logged
//!
//! Requests without a [`PeerData`] extension (plain HTTP listener) are
//! treated as having no peer data at all.

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::mtls::{CertIdentity, CertificateAuthenticator, DenialReason, PeerData, VerificationOutcome};

/// Require a valid client certificate.
pub async fn require_client_cert(
    State(authenticator): State<Arc<CertificateAuthenticator>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let outcome = match request.extensions().get::<PeerData>() {
        Some(peer) => authenticator.authenticate(peer),
        None => authenticator.authenticate(&PeerData::NoPeerData),
    };

    match outcome {
        VerificationOutcome::Allowed { subject_identity } => {
            debug!(
                client = %subject_identity.display_name,
                method = %request.method(),
                path = %request.uri().path(),
                "Authenticated request"
            );
            request.extensions_mut().insert::<CertIdentity>(subject_identity);
            next.run(request).await
        }
        VerificationOutcome::Denied { reason } => {
            // The authenticator's audit event already carries the reason.
            debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "Rejected unauthenticated write"
            );
            unauthorized_response(reason)
        }
    }
}

/// Create a 401 Unauthorized response
fn unauthorized_response(reason: DenialReason) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": reason.public_message() })),
    )
        .into_response()
}
