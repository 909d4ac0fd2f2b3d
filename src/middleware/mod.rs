//! Middleware del sistema
//!
//! Autorización por rol y CORS.

pub mod auth;
pub mod cors;

pub use auth::{authorize, AuthenticatedUser};
pub use cors::cors_layer;
