use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::generator_dto::{CreateGeneratorRequest, UpdateGeneratorRequest};
use crate::dto::ApiResponse;
use crate::models::generator::Generator;
use crate::repositories::generator_repository::GeneratorRepository;
use crate::utils::errors::{conflict_error, not_found_error, AppError};

pub struct GeneratorController {
    repository: GeneratorRepository,
}

impl GeneratorController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: GeneratorRepository::new(pool),
        }
    }

    pub async fn create(
        &self,
        request: CreateGeneratorRequest,
    ) -> Result<ApiResponse<Generator>, AppError> {
        request.validate()?;

        // Una sola entrada de catálogo por categoría KVA
        if self.repository.kva_exists(&request.kva).await? {
            return Err(conflict_error("Generator", "kva", &request.kva));
        }

        let generator = self.repository.create(request).await?;
        info!("⚡ Generador {} KVA añadido al catálogo", generator.kva);

        Ok(ApiResponse::success_with_message(generator, "Generator created"))
    }

    pub async fn list(&self) -> Result<ApiResponse<Vec<Generator>>, AppError> {
        Ok(ApiResponse::success(self.repository.list().await?))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<Generator>, AppError> {
        let generator = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Generator", &id.to_string()))?;

        Ok(ApiResponse::success(generator))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateGeneratorRequest,
    ) -> Result<ApiResponse<Generator>, AppError> {
        request.validate()?;

        if let Some(kva) = &request.kva {
            let current = self
                .repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| not_found_error("Generator", &id.to_string()))?;
            if current.kva != kva.trim() && self.repository.kva_exists(kva).await? {
                return Err(conflict_error("Generator", "kva", kva));
            }
        }

        let generator = self.repository.update(id, request).await?;
        Ok(ApiResponse::success_with_message(generator, "Generator updated"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.repository.delete(id).await?;
        info!("🗑️ Generador {} eliminado", id);
        Ok(ApiResponse::success_with_message((), "Generator deleted"))
    }
}
