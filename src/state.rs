//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. No hay estado global: la sesión de cada
//! request viaja en sus extensions.

use sqlx::PgPool;
use std::sync::Arc;

use crate::clients::fleetop::FleetopClient;
use crate::config::environment::EnvironmentConfig;
use crate::services::jwt_service::JwtService;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<EnvironmentConfig>,
    pub fleetop: Arc<FleetopClient>,
    pub jwt: Arc<JwtService>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig, fleetop: Arc<FleetopClient>) -> Self {
        let jwt = JwtService::new(&config.jwt_secret, config.jwt_expiration);
        Self {
            pool,
            config: Arc::new(config),
            fleetop,
            jwt: Arc::new(jwt),
        }
    }
}
