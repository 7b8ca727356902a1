//! HTTP surface for prescription upload and lookup.
//!
//! `api_router()` returns a composable `Router`; `server` binds it and
//! runs until shutdown.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, ApiServer};
pub use types::ApiContext;
