//! Modelo de Vehicle
//!
//! Vehículos de transporte de generadores; el IMEI identifica la unidad de
//! telemetría consultada en Fleetop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vehicle principal - mapea a la tabla vehicles
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub registration_number: String,
    pub imei: String,
    pub vehicle_status: String,
    pub created_at: DateTime<Utc>,
}
