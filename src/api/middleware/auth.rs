//! `X-API-KEY` header check for protected routes.
//!
//! Keys are compared as SHA-256 digests in constant time so the comparison
//! does not leak how many leading bytes matched.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::config::API_KEY_HEADER;

/// Require the configured API key.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_api_key(req: Request<axum::body::Body>, next: Next) -> Response {
    match check_api_key(&req) {
        Ok(()) => next.run(req).await,
        Err(err) => err.into_response(),
    }
}

fn check_api_key(req: &Request<axum::body::Body>) -> Result<(), ApiError> {
    let ctx = req
        .extensions()
        .get::<ApiContext>()
        .ok_or_else(|| ApiError::Internal("missing API context".into()))?;

    let expected = ctx
        .core
        .config
        .api_key
        .as_deref()
        .ok_or(ApiError::ApiKeyNotConfigured)?;

    let presented = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Forbidden)?;

    if keys_match(expected, presented) {
        Ok(())
    } else {
        tracing::warn!(path = %req.uri().path(), "Rejected request with invalid API key");
        Err(ApiError::Forbidden)
    }
}

fn keys_match(expected: &str, presented: &str) -> bool {
    let expected = Sha256::digest(expected.as_bytes());
    let presented = Sha256::digest(presented.as_bytes());
    expected.as_slice().ct_eq(presented.as_slice()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_keys_match() {
        assert!(keys_match("s3cret-key", "s3cret-key"));
    }

    #[test]
    fn different_keys_do_not_match() {
        assert!(!keys_match("s3cret-key", "s3cret-kez"));
        assert!(!keys_match("s3cret-key", "s3cret"));
        assert!(!keys_match("s3cret-key", ""));
    }
}
