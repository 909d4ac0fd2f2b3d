use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Add-on opcional (cables, combustible, operador...) - mapea a la tabla addons
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Addon {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
}
