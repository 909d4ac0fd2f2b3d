use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::models::vehicle::Vehicle;
use crate::utils::errors::{conflict_error, map_unique_violation, not_found_error, AppError};

pub struct VehicleRepository {
    pool: PgPool,
}

impl VehicleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> Result<Vehicle, AppError> {
        let registration = request.registration_number.trim().to_uppercase();
        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, name, registration_number, imei, vehicle_status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.name)
        .bind(&registration)
        .bind(request.imei)
        .bind(request.vehicle_status.unwrap_or_else(|| "available".to_string()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                conflict_error("Vehicle", "registration_number", &registration)
            })
        })?;

        Ok(vehicle)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Vehicle>, AppError> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(vehicle)
    }

    pub async fn list(&self) -> Result<Vec<Vehicle>, AppError> {
        let vehicles = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(vehicles)
    }

    pub async fn registration_exists(&self, registration_number: &str) -> Result<bool, AppError> {
        let result: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM vehicles WHERE registration_number = $1)",
        )
        .bind(registration_number.trim().to_uppercase())
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0)
    }

    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> Result<Vehicle, AppError> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        let vehicle = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET name = $2, registration_number = $3, imei = $4, vehicle_status = $5
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.name.unwrap_or(current.name))
        .bind(
            request
                .registration_number
                .map(|r| r.trim().to_uppercase())
                .unwrap_or(current.registration_number),
        )
        .bind(request.imei.unwrap_or(current.imei))
        .bind(request.vehicle_status.unwrap_or(current.vehicle_status))
        .fetch_one(&self.pool)
        .await?;

        Ok(vehicle)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        Ok(())
    }
}
