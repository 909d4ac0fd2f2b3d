//! Servicios de negocio
//!
//! Lógica de precios, ciclo de vida de reservas, autenticación y
//! sincronización con Fleetop.

pub mod auth_service;
pub mod jwt_service;
pub mod lifecycle_service;
pub mod pricing_service;
pub mod runtime_sync_service;
