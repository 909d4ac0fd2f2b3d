//! Proxy de Fleetop para el panel de administración
//!
//! `token` e `ignition_summary` se autentican de nuevo en cada llamada;
//! `hours` usa el token cacheado del cliente.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use validator::Validate;

use crate::clients::fleetop::{FleetopClient, IgnitionSummary, IgnitionSummaryRequest};
use crate::dto::fleetop_dto::{HoursRequest, IgnitionSummaryBody};
use crate::utils::errors::AppError;
use crate::utils::validation::{parse_fleetop_datetime, start_of_day};

pub struct FleetopController {
    client: Arc<FleetopClient>,
}

impl FleetopController {
    pub fn new(client: Arc<FleetopClient>) -> Self {
        Self { client }
    }

    pub async fn token(&self) -> Result<Value, AppError> {
        let token = self.client.get_token().await?;
        Ok(json!({ "usertoken": token }))
    }

    /// Reenvía el body a Fleetop y devuelve su JSON sin tocar
    pub async fn ignition_summary(&self, body: IgnitionSummaryBody) -> Result<Value, AppError> {
        body.validate()?;

        let token = self.client.get_token().await?;
        let request = IgnitionSummaryRequest {
            start_date_time: body.start_date_time,
            end_date_time: body.end_date_time,
            imei_nos: body.imei_nos,
        };

        Ok(self.client.ignition_summary_raw(&token, &request).await?)
    }

    /// Horas de motor normalizadas; `None` si Fleetop no tiene filas
    pub async fn hours(&self, request: HoursRequest) -> Result<Option<IgnitionSummary>, AppError> {
        request.validate()?;

        let offset = self.client.config().utc_offset;
        let now = Utc::now();
        let start = match request.start.as_deref() {
            Some(value) => local_to_utc(value, offset)?,
            None => start_of_day(now, offset),
        };
        let end = match request.end.as_deref() {
            Some(value) => local_to_utc(value, offset)?,
            None => now,
        };

        if end < start {
            return Err(AppError::BadRequest("end must not be before start".to_string()));
        }

        Ok(self.client.fetch_ignition_summary(&request.imei, start, end).await?)
    }
}

/// Fecha `dd-MM-yyyy HH:mm:ss` en la zona de Fleetop → UTC
fn local_to_utc(value: &str, offset: FixedOffset) -> Result<DateTime<Utc>, AppError> {
    let naive = parse_fleetop_datetime(value)
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}'", value)))?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| AppError::BadRequest(format!("Invalid date '{}'", value)))
}
