//! Cliente HTTP para Fleetop
//!
//! Autenticación con credenciales de configuración, consulta del resumen de
//! encendido (ignition summary) por IMEI y normalización de la respuesta.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::cache::TokenCache;
use crate::config::FleetopConfig;
use crate::utils::validation::format_fleetop_datetime;

#[derive(Debug, Error)]
pub enum FleetopError {
    #[error("Failed to fetch Fleetop token")]
    Token { status: Option<StatusCode>, body: String },

    #[error("Fleetop ignition summary request failed with status {status}")]
    Upstream { status: StatusCode, body: String },

    #[error("Fleetop request error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Body del endpoint de ignition summary, reenviado tal cual
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IgnitionSummaryRequest {
    pub start_date_time: String,
    pub end_date_time: String,
    pub imei_nos: String,
}

/// Resumen normalizado de horas de motor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IgnitionSummary {
    pub engine_on_hours: String,
    pub current_status: String,
    pub dg_name: String,
    pub no_of_times_on: i64,
}

/// Fuente de datos de encendido; la implementa `FleetopClient`
#[async_trait]
pub trait IgnitionSource: Send + Sync {
    async fn ignition_hours(
        &self,
        imei: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<IgnitionSummary>, FleetopError>;
}

pub struct FleetopClient {
    client: Client,
    config: FleetopConfig,
    tokens: TokenCache,
}

impl FleetopClient {
    pub fn new(config: FleetopConfig) -> Result<Self, FleetopError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let tokens = TokenCache::new(config.token_ttl, config.token_refresh_margin);

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &FleetopConfig {
        &self.config
    }

    /// Autenticarse contra Fleetop; siempre pide un token nuevo
    pub async fn get_token(&self) -> Result<String, FleetopError> {
        let response = self
            .client
            .post(self.config.token_url())
            .json(&json!({
                "username": self.config.username,
                "password": self.config.password,
            }))
            .send()
            .await
            .map_err(|e| {
                error!("❌ Error de red pidiendo token Fleetop: {}", e);
                FleetopError::Token {
                    status: None,
                    body: e.to_string(),
                }
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("❌ Fleetop token HTTP {}: {}", status, body);
            return Err(FleetopError::Token {
                status: Some(status),
                body,
            });
        }

        let token = serde_json::from_str::<Value>(&body)
            .ok()
            .as_ref()
            .and_then(extract_token)
            .ok_or_else(|| {
                error!("❌ Respuesta de token Fleetop sin usertoken: {}", body);
                FleetopError::Token {
                    status: Some(status),
                    body: body.clone(),
                }
            })?;

        info!("🔑 Token Fleetop obtenido");
        Ok(token)
    }

    /// Token cacheado con renovación anticipada
    pub async fn cached_token(&self) -> Result<String, FleetopError> {
        self.tokens.get_or_refresh(|| self.get_token()).await
    }

    /// POST al endpoint de ignition summary; devuelve el JSON de Fleetop sin tocar
    pub async fn ignition_summary_raw(
        &self,
        token: &str,
        request: &IgnitionSummaryRequest,
    ) -> Result<Value, FleetopError> {
        debug!(
            "📡 Fleetop ignition summary imei={} {} → {}",
            request.imei_nos, request.start_date_time, request.end_date_time
        );

        let response = self
            .client
            .post(self.config.ignition_url())
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Fleetop ignition summary HTTP {}: {}", status, body);
            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }
            return Err(FleetopError::Upstream { status, body });
        }

        Ok(response.json::<Value>().await?)
    }

    /// Resumen normalizado para un IMEI en un rango de fechas
    pub async fn fetch_ignition_summary(
        &self,
        imei: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<IgnitionSummary>, FleetopError> {
        let token = self.cached_token().await?;
        let request = IgnitionSummaryRequest {
            start_date_time: format_fleetop_datetime(start, self.config.utc_offset),
            end_date_time: format_fleetop_datetime(end, self.config.utc_offset),
            imei_nos: imei.to_string(),
        };

        let raw = self.ignition_summary_raw(&token, &request).await?;
        Ok(normalize_ignition_summary(&raw, imei))
    }
}

#[async_trait]
impl IgnitionSource for FleetopClient {
    async fn ignition_hours(
        &self,
        imei: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<IgnitionSummary>, FleetopError> {
        self.fetch_ignition_summary(imei, start, end).await
    }
}

/// Extraer el token de la respuesta de autenticación
pub fn extract_token(body: &Value) -> Option<String> {
    ["usertoken", "token", "access_token"]
        .iter()
        .find_map(|key| body.get(*key).or_else(|| body.get("data").and_then(|d| d.get(*key))))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn first_field<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| row.get(*key)).filter(|v| !v.is_null())
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalizar la respuesta de Fleetop; `None` si no hay filas
pub fn normalize_ignition_summary(raw: &Value, imei: &str) -> Option<IgnitionSummary> {
    let rows = raw
        .get("data")
        .or_else(|| raw.get("result"))
        .unwrap_or(raw)
        .as_array()?;

    let row = rows
        .iter()
        .find(|row| {
            first_field(row, &["imei", "imei_no"])
                .map(|v| value_to_string(v) == imei)
                .unwrap_or(false)
        })
        .or_else(|| rows.first())?;

    let engine_on_hours = first_field(
        row,
        &["engine_on_hours", "engineOnHours", "total_engine_on_hours", "ignition_on_duration"],
    )
    .map(value_to_string)
    .unwrap_or_else(|| "00:00:00".to_string());

    let current_status = first_field(row, &["current_status", "currentStatus", "status"])
        .map(value_to_string)
        .unwrap_or_else(|| "Unknown".to_string());

    let dg_name = first_field(row, &["dg_name", "dgName", "vehicle_name", "vehicle_number"])
        .map(value_to_string)
        .unwrap_or_default();

    let no_of_times_on = first_field(row, &["no_of_times_on", "noOfTimesOn", "ignition_on_count"])
        .and_then(|v| v.as_i64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .unwrap_or(0);

    Some(IgnitionSummary {
        engine_on_hours,
        current_status,
        dg_name,
        no_of_times_on,
    })
}
