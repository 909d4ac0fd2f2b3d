use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::vehicle::Vehicle;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::utils::errors::{conflict_error, not_found_error, AppError};

pub struct VehicleController {
    repository: VehicleRepository,
}

impl VehicleController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: VehicleRepository::new(pool),
        }
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;

        // Verificar que la matrícula no exista
        if self
            .repository
            .registration_exists(&request.registration_number)
            .await?
        {
            return Err(conflict_error(
                "Vehicle",
                "registration_number",
                &request.registration_number,
            ));
        }

        let vehicle = self.repository.create(request).await?;
        info!(
            "🚚 Vehículo {} registrado (imei {})",
            vehicle.registration_number, vehicle.imei
        );

        Ok(ApiResponse::success_with_message(vehicle, "Vehicle created"))
    }

    pub async fn list(&self) -> Result<ApiResponse<Vec<Vehicle>>, AppError> {
        Ok(ApiResponse::success(self.repository.list().await?))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<Vehicle>, AppError> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(ApiResponse::success(vehicle))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;

        if let Some(registration) = &request.registration_number {
            let current = self
                .repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;
            let changed = !current
                .registration_number
                .eq_ignore_ascii_case(registration.trim());
            if changed && self.repository.registration_exists(registration).await? {
                return Err(conflict_error("Vehicle", "registration_number", registration));
            }
        }

        let vehicle = self.repository.update(id, request).await?;
        Ok(ApiResponse::success_with_message(vehicle, "Vehicle updated"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.repository.delete(id).await?;
        Ok(ApiResponse::success_with_message((), "Vehicle deleted"))
    }
}
