use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::booking::{
    Booking, BookingAddon, BookingStatus, GeneratorLine, PricingSource, RuntimeStats,
};
use crate::utils::errors::{not_found_error, AppError};

/// Datos para insertar una reserva nueva
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: Option<Uuid>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub company: Option<String>,
    pub location: String,
    pub booking_date: NaiveDate,
    pub generators: Vec<GeneratorLine>,
    pub addons: Vec<BookingAddon>,
    pub pricing_source: PricingSource,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub estimated_cost: Decimal,
}

pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewBooking) -> Result<Booking, AppError> {
        let now = Utc::now();
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (
                id, customer_id, customer_name, customer_email, customer_phone, company,
                location, booking_date, generators, addons, status, pricing_source,
                subtotal, tax, estimated_cost, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'Pending', $11, $12, $13, $14, $15, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.customer_id)
        .bind(new.customer_name)
        .bind(new.customer_email)
        .bind(new.customer_phone)
        .bind(new.company)
        .bind(new.location)
        .bind(new.booking_date)
        .bind(Json(new.generators))
        .bind(Json(new.addons))
        .bind(new.pricing_source)
        .bind(new.subtotal)
        .bind(new.tax)
        .bind(new.estimated_cost)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(booking)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, AppError> {
        let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(booking)
    }

    pub async fn list(&self, status: Option<BookingStatus>) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE ($1::booking_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn list_by_customer(&self, customer_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    pub async fn list_by_driver(&self, driver_id: Uuid) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE driver_info ->> 'driver_id' = $1
            ORDER BY booking_date ASC
            "#,
        )
        .bind(driver_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Reservas activas con vehículo asignado, para el poller de Fleetop
    pub async fn list_active_with_vehicle(&self) -> Result<Vec<Booking>, AppError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE status = 'Active' AND vehicle_info IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    /// Leer-modificar-escribir con bloqueo de fila.
    ///
    /// `apply` trabaja sobre una copia; si devuelve error la transacción se
    /// descarta y el registro queda como estaba.
    pub async fn update_with<F, T>(&self, id: Uuid, apply: F) -> Result<(Booking, T), AppError>
    where
        F: FnOnce(&mut Booking) -> Result<T, AppError>,
    {
        let mut tx = self.pool.begin().await?;

        let mut booking =
            sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| not_found_error("Booking", &id.to_string()))?;

        let outcome = apply(&mut booking)?;

        let saved = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings
            SET generators = $2, status = $3, driver_info = $4, vehicle_info = $5, updated_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(booking.id)
        .bind(&booking.generators)
        .bind(booking.status)
        .bind(&booking.driver_info)
        .bind(&booking.vehicle_info)
        .bind(booking.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((saved, outcome))
    }

    /// Sobrescribir los datos de Fleetop; idempotente
    pub async fn save_runtime_stats(&self, id: Uuid, stats: &RuntimeStats) -> Result<(), AppError> {
        sqlx::query("UPDATE bookings SET runtime_stats = $2 WHERE id = $1")
            .bind(id)
            .bind(Json(stats))
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
