use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::addon_dto::{CreateAddonRequest, UpdateAddonRequest};
use crate::dto::ApiResponse;
use crate::models::addon::Addon;
use crate::repositories::addon_repository::AddonRepository;
use crate::utils::errors::{not_found_error, AppError};

pub struct AddonController {
    repository: AddonRepository,
}

fn ensure_price(price: Decimal) -> Result<(), AppError> {
    if price.is_sign_negative() {
        return Err(AppError::BadRequest("Add-on price cannot be negative".to_string()));
    }
    Ok(())
}

impl AddonController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: AddonRepository::new(pool),
        }
    }

    pub async fn create(&self, request: CreateAddonRequest) -> Result<ApiResponse<Addon>, AppError> {
        request.validate()?;
        ensure_price(request.price)?;

        let addon = self.repository.create(request).await?;
        Ok(ApiResponse::success_with_message(addon, "Add-on created"))
    }

    pub async fn list(&self) -> Result<ApiResponse<Vec<Addon>>, AppError> {
        Ok(ApiResponse::success(self.repository.list().await?))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<Addon>, AppError> {
        let addon = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Addon", &id.to_string()))?;

        Ok(ApiResponse::success(addon))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateAddonRequest,
    ) -> Result<ApiResponse<Addon>, AppError> {
        request.validate()?;
        if let Some(price) = request.price {
            ensure_price(price)?;
        }

        let addon = self.repository.update(id, request).await?;
        Ok(ApiResponse::success_with_message(addon, "Add-on updated"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<ApiResponse<()>, AppError> {
        self.repository.delete(id).await?;
        Ok(ApiResponse::success_with_message((), "Add-on deleted"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_addon_price_rejected() {
        assert!(ensure_price(Decimal::new(-1, 2)).is_err());
        assert!(ensure_price(Decimal::ZERO).is_ok());
        assert!(ensure_price(Decimal::from(500)).is_ok());
    }
}
