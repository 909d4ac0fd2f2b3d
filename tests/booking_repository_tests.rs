//! Tests de `BookingRepository` contra PostgreSQL real
//!
//! Requieren `TEST_DATABASE_URL`; se ejecutan con `cargo test -- --ignored`.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use generator_rental::config::DatabaseConfig;
use generator_rental::models::booking::{BookingStatus, GeneratorLine, PricingSource};
use generator_rental::repositories::booking_repository::{BookingRepository, NewBooking};
use generator_rental::services::lifecycle_service::LifecycleService;
use generator_rental::utils::errors::AppError;

async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = DatabaseConfig::new(url).create_pool().await.expect("pool");
    DatabaseConfig::run_migrations(&pool).await.expect("migrations");
    pool
}

fn new_booking() -> NewBooking {
    NewBooking {
        customer_id: None,
        customer_name: "Asha Rao".to_string(),
        customer_email: format!("asha+{}@example.com", Uuid::new_v4()),
        customer_phone: "9876543210".to_string(),
        company: None,
        location: "Pune".to_string(),
        booking_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
        generators: vec![GeneratorLine {
            kva_category: "125".to_string(),
            quantity: 1,
            additional_hours: 0,
            usage_hours: None,
            base_cost: Decimal::from(10_000),
            additional_cost: Decimal::ZERO,
            total: Decimal::from(10_000),
            status: None,
            timers: Vec::new(),
        }],
        addons: Vec::new(),
        pricing_source: PricingSource::Form,
        subtotal: Decimal::from(10_000),
        tax: Decimal::from(1_800),
        estimated_cost: Decimal::from(11_800),
    }
}

#[tokio::test]
#[ignore] // Requiere TEST_DATABASE_URL
async fn test_rejected_update_rolls_back() {
    let repository = BookingRepository::new(test_pool().await);
    let booking = repository.create(new_booking()).await.unwrap();

    // La copia se modifica antes de fallar; nada debe persistir
    let result = repository
        .update_with(booking.id, |b| {
            b.status = BookingStatus::Voided;
            b.lines_mut()[0].quantity = 99;
            Err::<(), AppError>(AppError::Conflict("rejected".to_string()))
        })
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));

    let stored = repository.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Pending);
    assert_eq!(stored.lines()[0].quantity, 1);
    assert_eq!(stored.updated_at, booking.updated_at);
}

#[tokio::test]
#[ignore] // Requiere TEST_DATABASE_URL
async fn test_invalid_transition_leaves_row_untouched() {
    let repository = BookingRepository::new(test_pool().await);
    let booking = repository.create(new_booking()).await.unwrap();
    let now = Utc::now();

    repository
        .update_with(booking.id, |b| Ok(LifecycleService::change_status(b, BookingStatus::Rejected, now)?))
        .await
        .unwrap();

    let err = repository
        .update_with(booking.id, |b| Ok(LifecycleService::change_status(b, BookingStatus::Approved, now)?))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let stored = repository.find_by_id(booking.id).await.unwrap().unwrap();
    assert_eq!(stored.status, BookingStatus::Rejected);
}
