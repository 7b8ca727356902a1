//! Middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Access log: method, path, status, elapsed time for every request
//! 2. API key check: protected routes only

pub mod audit;
pub mod auth;
