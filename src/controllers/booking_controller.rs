//! Controlador de reservas
//!
//! Crea reservas desde el formulario o el carrito, y aplica las transiciones
//! de estado del admin, del cliente y del conductor. Toda modificación pasa
//! por `BookingRepository::update_with`, que bloquea la fila.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{
    AssignBookingRequest, BookingFilters, CartCheckoutRequest, CreateBookingRequest,
    CustomerDetails, UpdateBookingStatusRequest,
};
use crate::dto::pricing_dto::Totals;
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::{
    Booking, BookingAddon, DriverInfo, GeneratorLine, LineStatus, PricingSource, VehicleInfo,
};
use crate::models::user::UserRole;
use crate::repositories::addon_repository::AddonRepository;
use crate::repositories::booking_repository::{BookingRepository, NewBooking};
use crate::repositories::generator_repository::GeneratorRepository;
use crate::repositories::user_repository::UserRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::lifecycle_service::{DriverAction, LifecycleService};
use crate::services::pricing_service::{PriceCatalog, PricingService};
use crate::utils::errors::{not_found_error, AppError};

pub struct BookingController {
    bookings: BookingRepository,
    generators: GeneratorRepository,
    addons: AddonRepository,
    users: UserRepository,
    vehicles: VehicleRepository,
    gst_rate: Decimal,
}

impl BookingController {
    pub fn new(pool: PgPool, gst_rate: Decimal) -> Self {
        Self {
            bookings: BookingRepository::new(pool.clone()),
            generators: GeneratorRepository::new(pool.clone()),
            addons: AddonRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
            gst_rate,
        }
    }

    async fn catalog(&self) -> Result<PriceCatalog, AppError> {
        Ok(PriceCatalog::new(self.generators.list().await?))
    }

    async fn selected_addons(&self, ids: &[Uuid]) -> Result<Vec<BookingAddon>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let addons = self.addons.find_many(ids).await?;
        Ok(addons
            .into_iter()
            .map(|a| BookingAddon {
                addon_id: a.id,
                name: a.name,
                price: a.price,
            })
            .collect())
    }

    async fn insert(
        &self,
        user: &AuthenticatedUser,
        customer: CustomerDetails,
        pricing_source: PricingSource,
        lines: Vec<GeneratorLine>,
        addons: Vec<BookingAddon>,
        totals: Totals,
    ) -> Result<Booking, AppError> {
        if lines.is_empty() {
            return Err(AppError::BadRequest(
                "None of the requested KVA categories are available".to_string(),
            ));
        }

        let booking = self
            .bookings
            .create(NewBooking {
                customer_id: Some(user.user_id),
                customer_name: customer.name,
                customer_email: customer.email,
                customer_phone: customer.phone,
                company: customer.company,
                location: customer.location,
                booking_date: customer.booking_date,
                generators: lines,
                addons,
                pricing_source,
                subtotal: totals.subtotal,
                tax: totals.tax,
                estimated_cost: totals.total,
            })
            .await?;

        info!(
            "📝 Reserva {} creada ({:?}) total {}",
            booking.id, pricing_source, booking.estimated_cost
        );
        Ok(booking)
    }

    /// Reserva desde el formulario
    pub async fn create_from_form(
        &self,
        user: &AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        request.validate()?;

        let catalog = self.catalog().await?;
        let estimate = PricingService::estimate_booking(&request.generators, &catalog);
        let totals = PricingService::apply_tax(estimate.grand_total, self.gst_rate);
        let addons = self.selected_addons(&request.addon_ids).await?;

        let booking = self
            .insert(user, request.customer, PricingSource::Form, estimate.lines, addons, totals)
            .await?;

        Ok(ApiResponse::success_with_message(booking, "Booking request submitted"))
    }

    /// Reserva desde el carrito
    pub async fn checkout_cart(
        &self,
        user: &AuthenticatedUser,
        request: CartCheckoutRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        request.validate()?;

        let catalog = self.catalog().await?;
        let checkout = PricingService::checkout_cart(&request.items, &catalog, self.gst_rate);
        let addons = self.selected_addons(&request.addon_ids).await?;

        let booking = self
            .insert(
                user,
                request.customer,
                PricingSource::Cart,
                checkout.lines,
                addons,
                Totals {
                    subtotal: checkout.subtotal,
                    tax: checkout.gst,
                    total: checkout.total,
                },
            )
            .await?;

        Ok(ApiResponse::success_with_message(booking, "Cart checked out"))
    }

    pub async fn list(&self, filters: BookingFilters) -> Result<ApiResponse<Vec<Booking>>, AppError> {
        let bookings = self.bookings.list(filters.status).await?;
        Ok(ApiResponse::success(bookings))
    }

    pub async fn list_mine(&self, user: &AuthenticatedUser) -> Result<ApiResponse<Vec<Booking>>, AppError> {
        let bookings = self.bookings.list_by_customer(user.user_id).await?;
        Ok(ApiResponse::success(bookings))
    }

    pub async fn list_for_driver(
        &self,
        user: &AuthenticatedUser,
    ) -> Result<ApiResponse<Vec<Booking>>, AppError> {
        let bookings = self.bookings.list_by_driver(user.user_id).await?;
        Ok(ApiResponse::success(bookings))
    }

    pub async fn get(&self, user: &AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Booking>, AppError> {
        let booking = self
            .bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &id.to_string()))?;

        ensure_can_view(user, &booking)?;
        Ok(ApiResponse::success(booking))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateBookingStatusRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        let now = Utc::now();
        let (booking, ()) = self
            .bookings
            .update_with(id, |b| Ok(LifecycleService::change_status(b, request.status, now)?))
            .await?;

        info!("🔁 Reserva {} → {}", booking.id, booking.status);
        Ok(ApiResponse::success(booking))
    }

    /// Cancelación del cliente; el admin puede cancelar cualquiera
    pub async fn cancel(&self, user: &AuthenticatedUser, id: Uuid) -> Result<ApiResponse<Booking>, AppError> {
        let now = Utc::now();
        let (booking, ()) = self
            .bookings
            .update_with(id, |b| {
                if !user.is_admin() && b.customer_id != Some(user.user_id) {
                    return Err(AppError::Forbidden(
                        "Only the customer can cancel this booking".to_string(),
                    ));
                }
                Ok(LifecycleService::cancel(b, now)?)
            })
            .await?;

        info!("🚫 Reserva {} cancelada", booking.id);
        Ok(ApiResponse::success(booking))
    }

    pub async fn assign(
        &self,
        id: Uuid,
        request: AssignBookingRequest,
    ) -> Result<ApiResponse<Booking>, AppError> {
        let driver = self
            .users
            .find_by_id(request.driver_id)
            .await?
            .filter(|u| u.role == UserRole::Driver)
            .ok_or_else(|| not_found_error("Driver", &request.driver_id.to_string()))?;

        let vehicle = self
            .vehicles
            .find_by_id(request.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &request.vehicle_id.to_string()))?;

        let now = Utc::now();
        let driver_info = DriverInfo {
            driver_id: driver.id,
            name: driver.full_name,
            phone: driver.phone,
            assigned_at: now,
        };
        let vehicle_info = VehicleInfo {
            vehicle_id: vehicle.id,
            name: vehicle.name,
            registration_number: vehicle.registration_number,
            imei: vehicle.imei,
        };

        let (booking, ()) = self
            .bookings
            .update_with(id, |b| {
                Ok(LifecycleService::assign(b, driver_info, vehicle_info, now)?)
            })
            .await?;

        info!(
            "🚚 Reserva {} asignada a conductor {} con vehículo {}",
            booking.id, request.driver_id, request.vehicle_id
        );
        Ok(ApiResponse::success(booking))
    }

    /// Acción del conductor sobre una línea de generador
    pub async fn driver_action(
        &self,
        user: &AuthenticatedUser,
        id: Uuid,
        line_index: usize,
        action: DriverAction,
    ) -> Result<ApiResponse<Booking>, AppError> {
        let now = Utc::now();
        let (booking, line_status) = self
            .bookings
            .update_with(id, |b| {
                if b.driver_id() != Some(user.user_id) {
                    return Err(AppError::Forbidden(
                        "Booking is not assigned to this driver".to_string(),
                    ));
                }
                Ok(LifecycleService::apply_driver_action(b, line_index, action, now)?)
            })
            .await?;

        info!(
            "⏱️ Reserva {} línea {}: {} → {:?} (reserva {})",
            booking.id, line_index, action, line_status, booking.status
        );

        let message = match line_status {
            LineStatus::Completed => "Duty ended",
            LineStatus::Paused => "Duty paused",
            _ => "Duty running",
        };
        Ok(ApiResponse::success_with_message(booking, message))
    }
}

/// Admin ve todo; el conductor sólo lo asignado; el cliente sólo lo suyo
pub fn ensure_can_view(user: &AuthenticatedUser, booking: &Booking) -> Result<(), AppError> {
    let allowed = match user.role {
        UserRole::Admin => true,
        UserRole::Driver => booking.driver_id() == Some(user.user_id),
        UserRole::User => booking.customer_id == Some(user.user_id),
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::Forbidden("You cannot access this booking".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::BookingStatus;
    use chrono::NaiveDate;
    use sqlx::types::Json;

    fn booking(customer_id: Option<Uuid>, driver_id: Option<Uuid>) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            customer_id,
            customer_name: "Ravi".to_string(),
            customer_email: "ravi@example.com".to_string(),
            customer_phone: "9876543210".to_string(),
            company: None,
            location: "Mumbai".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            generators: Json(Vec::new()),
            addons: Json(Vec::new()),
            status: BookingStatus::Approved,
            pricing_source: PricingSource::Form,
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            estimated_cost: Decimal::ZERO,
            driver_info: driver_id.map(|driver_id| {
                Json(DriverInfo {
                    driver_id,
                    name: "Sunil".to_string(),
                    phone: None,
                    assigned_at: now,
                })
            }),
            vehicle_info: None,
            runtime_stats: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(role: UserRole) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_admin_sees_any_booking() {
        assert!(ensure_can_view(&user(UserRole::Admin), &booking(None, None)).is_ok());
    }

    #[test]
    fn test_customer_sees_only_own_booking() {
        let customer = user(UserRole::User);
        assert!(ensure_can_view(&customer, &booking(Some(customer.user_id), None)).is_ok());
        assert!(matches!(
            ensure_can_view(&customer, &booking(Some(Uuid::new_v4()), None)),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn test_driver_sees_only_assigned_booking() {
        let driver = user(UserRole::Driver);
        assert!(ensure_can_view(&driver, &booking(None, Some(driver.user_id))).is_ok());
        assert!(ensure_can_view(&driver, &booking(None, Some(Uuid::new_v4()))).is_err());
        assert!(ensure_can_view(&driver, &booking(None, None)).is_err());
    }
}
