use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::booking::GeneratorLine;

/// Línea del formulario de reserva
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EstimateLineRequest {
    #[validate(length(min = 1, max = 20))]
    pub kva_category: String,

    #[validate(range(min = 1, max = 100))]
    pub quantity: u32,

    #[serde(default)]
    #[validate(range(max = 720))]
    pub additional_hours: u32,
}

/// Ítem del carrito
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CartItemRequest {
    #[validate(length(min = 1, max = 20))]
    pub kva_category: String,

    #[validate(range(min = 1, max = 100))]
    pub quantity: u32,

    #[validate(range(min = 1, max = 720))]
    pub usage_hours: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EstimateRequest {
    #[validate(length(min = 1))]
    #[validate]
    pub generators: Vec<EstimateLineRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CartRequest {
    #[validate(length(min = 1))]
    #[validate]
    pub items: Vec<CartItemRequest>,
}

/// Resultado del flujo de formulario
#[derive(Debug, Clone, Serialize)]
pub struct BookingEstimate {
    pub lines: Vec<GeneratorLine>,
    pub grand_total: Decimal,
}

/// Subtotal, impuesto y total
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Resultado del flujo de carrito
#[derive(Debug, Clone, Serialize)]
pub struct CartCheckout {
    pub lines: Vec<GeneratorLine>,
    pub subtotal: Decimal,
    pub gst: Decimal,
    pub total: Decimal,
}

/// Estimación del formulario con el impuesto que se guardará en la reserva
#[derive(Debug, Clone, Serialize)]
pub struct EstimateResponse {
    pub lines: Vec<GeneratorLine>,
    pub grand_total: Decimal,
    pub tax: Decimal,
    pub estimated_cost: Decimal,
}
