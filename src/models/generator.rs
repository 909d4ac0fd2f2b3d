//! Modelo del catálogo de generadores
//!
//! Cada entrada se identifica por su categoría KVA, que es la clave usada por
//! las líneas de reserva y por el calculador de precios.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Horas cubiertas por el precio base en el flujo de formulario
pub const BASE_PRICE_HOURS: u32 = 5;

/// Generator - mapea a la tabla generators
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Generator {
    pub id: Uuid,
    pub kva: String,
    pub name: String,
    pub image_url: Option<String>,
    pub description: Option<String>,
    /// Cubre las primeras `BASE_PRICE_HOURS` horas
    pub base_price: Decimal,
    pub price_per_additional_hour: Decimal,
    /// Tarifa del flujo de carrito
    pub price_per_hour: Decimal,
    pub created_at: DateTime<Utc>,
}
