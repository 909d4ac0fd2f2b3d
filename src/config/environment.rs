//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Las credenciales de Fleetop se leen del entorno, nunca del código.

use anyhow::{Context, Result};
use chrono::FixedOffset;
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Configuración del cliente Fleetop
#[derive(Debug, Clone)]
pub struct FleetopConfig {
    pub base_url: String,
    pub token_path: String,
    pub ignition_path: String,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    /// Zona horaria en la que Fleetop interpreta las fechas
    pub utc_offset: FixedOffset,
    pub poll_interval: Duration,
    pub poll_enabled: bool,
    /// Vida del token cacheado
    pub token_ttl: Duration,
    /// Margen antes de la expiración en el que se renueva el token
    pub token_refresh_margin: Duration,
}

impl FleetopConfig {
    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.token_path)
    }

    pub fn ignition_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.ignition_path)
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    /// Tasa de GST aplicada a los subtotales (0.18 por defecto)
    pub gst_rate: Decimal,
    pub fleetop: FleetopConfig,
}

/// Leer una variable opcional y parsearla, usando `default` si no existe
fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Duración en segundos; cero no es válido
fn positive_secs(key: &str, default: u64) -> Result<Duration> {
    let secs: u64 = parse_or(key, default)?;
    if secs == 0 {
        anyhow::bail!("{} must be greater than zero", key);
    }
    Ok(Duration::from_secs(secs))
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

impl EnvironmentConfig {
    /// Cargar la configuración desde las variables de entorno
    pub fn from_env() -> Result<Self> {
        let offset_minutes: i32 = parse_or("FLEETOP_UTC_OFFSET_MINUTES", 330)?;
        let utc_offset = FixedOffset::east_opt(offset_minutes * 60)
            .context("FLEETOP_UTC_OFFSET_MINUTES out of range")?;

        let fleetop = FleetopConfig {
            base_url: required("FLEETOP_BASE_URL")?,
            token_path: env::var("FLEETOP_TOKEN_PATH")
                .unwrap_or_else(|_| "/api/auth/token".to_string()),
            ignition_path: env::var("FLEETOP_IGNITION_PATH")
                .unwrap_or_else(|_| "/api/reports/ignition-summary".to_string()),
            username: required("FLEETOP_USERNAME")?,
            password: required("FLEETOP_PASSWORD")?,
            timeout: positive_secs("FLEETOP_TIMEOUT_SECS", 30)?,
            utc_offset,
            poll_interval: positive_secs("FLEETOP_POLL_INTERVAL_SECS", 60)?,
            poll_enabled: parse_or("FLEETOP_POLL_ENABLED", true)?,
            token_ttl: Duration::from_secs(30 * 60),
            token_refresh_margin: Duration::from_secs(5 * 60),
        };

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: parse_or("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expiration: parse_or("JWT_EXPIRATION", 86_400)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            gst_rate: parse_or("GST_RATE", Decimal::new(18, 2))?,
            fleetop,
        })
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_secs_rejects_zero() {
        env::set_var("TEST_ENV_ZERO_SECS", "0");
        let err = positive_secs("TEST_ENV_ZERO_SECS", 60).unwrap_err();
        assert_eq!(err.to_string(), "TEST_ENV_ZERO_SECS must be greater than zero");
    }

    #[test]
    fn test_positive_secs_parses_and_defaults() {
        env::set_var("TEST_ENV_POLL_SECS", " 15 ");
        assert_eq!(positive_secs("TEST_ENV_POLL_SECS", 60).unwrap(), Duration::from_secs(15));
        assert_eq!(
            positive_secs("TEST_ENV_UNSET_SECS", 60).unwrap(),
            Duration::from_secs(60)
        );

        env::set_var("TEST_ENV_BAD_SECS", "soon");
        assert!(positive_secs("TEST_ENV_BAD_SECS", 60).is_err());
    }
}
