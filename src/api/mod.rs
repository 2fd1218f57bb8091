//! HTTP API: posts endpoints, client certificate guard, TLS listener

pub mod auth;
mod errors;
pub mod posts;
pub mod router;
mod server;
pub mod tls;

pub use auth::require_client_cert;
pub use router::{AppState, create_router};
pub use server::ApiServer;
pub use tls::PeerCertAcceptor;
