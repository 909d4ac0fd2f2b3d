//! Servicio de alquiler de generadores
//!
//! API de reservas con precios por KVA, ciclo de vida de las líneas de
//! generador por parte de los conductores e integración con el tracker
//! Fleetop para las horas de motor.

pub mod cache;
pub mod clients;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_router;
pub use state::AppState;
