//! Endpoint handlers.

pub mod health;
pub mod prescriptions;
