//! Modelo de Booking
//!
//! Una reserva es un único registro: las líneas de generadores, sus timers y
//! los snapshots de conductor/vehículo viven en columnas JSONB de la tabla
//! `bookings`, de modo que cada acción se persiste como una sola actualización.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Estado de la reserva - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "booking_status")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Voided,
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Approved => "Approved",
            BookingStatus::Rejected => "Rejected",
            BookingStatus::Voided => "Voided",
            BookingStatus::Active => "Active",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flujo de creación con el que se calcularon los importes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "pricing_source")]
pub enum PricingSource {
    /// Formulario: precio base (5 horas) + horas adicionales
    Form,
    /// Carrito: precio por hora con GST plano
    Cart,
}

/// Estado de ejecución de una línea de generador
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LineStatus {
    Assigned,
    Active,
    Paused,
    Completed,
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LineStatus::Assigned => "Assigned",
            LineStatus::Active => "Active",
            LineStatus::Paused => "Paused",
            LineStatus::Completed => "Completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Running,
    Stopped,
}

/// Tramo de servicio de un conductor sobre una línea
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Timer {
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    /// Duración en segundos, sólo cuando el timer está cerrado
    #[serde(default)]
    pub duration: Option<i64>,
    pub status: TimerStatus,
}

impl Timer {
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            start_time: now,
            end_time: None,
            duration: None,
            status: TimerStatus::Running,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn stop(&mut self, now: DateTime<Utc>) {
        self.end_time = Some(now);
        self.duration = Some((now - self.start_time).num_seconds().max(0));
        self.status = TimerStatus::Stopped;
    }
}

/// Línea de generador solicitada en una reserva
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorLine {
    pub kva_category: String,
    pub quantity: u32,
    #[serde(default)]
    pub additional_hours: u32,
    /// Horas de uso del flujo de carrito
    #[serde(default)]
    pub usage_hours: Option<u32>,
    pub base_cost: Decimal,
    pub additional_cost: Decimal,
    pub total: Decimal,
    /// `None` hasta que el admin asigna conductor y vehículo
    #[serde(default)]
    pub status: Option<LineStatus>,
    #[serde(default)]
    pub timers: Vec<Timer>,
}

impl GeneratorLine {
    pub fn open_timer_mut(&mut self) -> Option<&mut Timer> {
        self.timers.iter_mut().find(|t| t.is_open())
    }

    pub fn open_timer_count(&self) -> usize {
        self.timers.iter().filter(|t| t.is_open()).count()
    }

    /// Segundos acumulados en timers cerrados
    pub fn worked_seconds(&self) -> i64 {
        self.timers.iter().filter_map(|t| t.duration).sum()
    }
}

/// Add-on seleccionado, copiado a la reserva en el momento de crearla
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookingAddon {
    pub addon_id: Uuid,
    pub name: String,
    pub price: Decimal,
}

/// Snapshot del conductor asignado
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DriverInfo {
    pub driver_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub assigned_at: DateTime<Utc>,
}

/// Snapshot del vehículo asignado
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VehicleInfo {
    pub vehicle_id: Uuid,
    pub name: String,
    pub registration_number: String,
    pub imei: String,
}

/// Últimos datos de encendido obtenidos de Fleetop
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStats {
    pub engine_on_hours: String,
    pub current_status: String,
    pub dg_name: String,
    pub no_of_times_on: i64,
    pub fetched_at: DateTime<Utc>,
}

/// Booking principal - mapea a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub company: Option<String>,
    pub location: String,
    pub booking_date: NaiveDate,
    pub generators: Json<Vec<GeneratorLine>>,
    pub addons: Json<Vec<BookingAddon>>,
    pub status: BookingStatus,
    pub pricing_source: PricingSource,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub estimated_cost: Decimal,
    pub driver_info: Option<Json<DriverInfo>>,
    pub vehicle_info: Option<Json<VehicleInfo>>,
    pub runtime_stats: Option<Json<RuntimeStats>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn lines(&self) -> &[GeneratorLine] {
        &self.generators.0
    }

    pub fn lines_mut(&mut self) -> &mut Vec<GeneratorLine> {
        &mut self.generators.0
    }

    pub fn driver_id(&self) -> Option<Uuid> {
        self.driver_info.as_ref().map(|d| d.0.driver_id)
    }

    pub fn vehicle_imei(&self) -> Option<&str> {
        self.vehicle_info.as_ref().map(|v| v.0.imei.as_str())
    }

    /// Inicio del timer más antiguo de todas las líneas
    pub fn earliest_timer_start(&self) -> Option<DateTime<Utc>> {
        self.lines()
            .iter()
            .flat_map(|l| l.timers.iter())
            .map(|t| t.start_time)
            .min()
    }
}
