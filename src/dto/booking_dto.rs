use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::dto::pricing_dto::{CartItemRequest, EstimateLineRequest};
use crate::models::booking::BookingStatus;
use crate::utils::validation::PHONE_REGEX;

/// Datos del cliente comunes a ambos flujos de reserva
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomerDetails {
    #[validate(length(min = 2, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(regex = "PHONE_REGEX")]
    pub phone: String,

    #[validate(length(max = 100))]
    pub company: Option<String>,

    #[validate(length(min = 2, max = 500))]
    pub location: String,

    pub booking_date: NaiveDate,
}

// Request del formulario de reserva
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[serde(flatten)]
    #[validate]
    pub customer: CustomerDetails,

    #[validate(length(min = 1))]
    #[validate]
    pub generators: Vec<EstimateLineRequest>,

    #[serde(default)]
    pub addon_ids: Vec<Uuid>,
}

// Request de checkout del carrito
#[derive(Debug, Deserialize, Validate)]
pub struct CartCheckoutRequest {
    #[serde(flatten)]
    #[validate]
    pub customer: CustomerDetails,

    #[validate(length(min = 1))]
    #[validate]
    pub items: Vec<CartItemRequest>,

    #[serde(default)]
    pub addon_ids: Vec<Uuid>,
}

/// Cambio de estado por parte del admin
#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

/// Asignación de conductor y vehículo
#[derive(Debug, Deserialize)]
pub struct AssignBookingRequest {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct BookingFilters {
    pub status: Option<BookingStatus>,
}
