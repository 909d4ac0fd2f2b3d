//! Modelos de datos
//!
//! Structs que mapean las tablas de PostgreSQL.

pub mod addon;
pub mod booking;
pub mod generator;
pub mod user;
pub mod vehicle;
