//! Caches en memoria del proceso

pub mod token_cache;

pub use token_cache::TokenCache;
