use rust_decimal::Decimal;
use sqlx::PgPool;
use validator::Validate;

use crate::dto::pricing_dto::{CartCheckout, CartRequest, EstimateRequest, EstimateResponse};
use crate::dto::ApiResponse;
use crate::repositories::generator_repository::GeneratorRepository;
use crate::services::pricing_service::{PriceCatalog, PricingService};
use crate::utils::errors::AppError;

pub struct PricingController {
    generators: GeneratorRepository,
    gst_rate: Decimal,
}

impl PricingController {
    pub fn new(pool: PgPool, gst_rate: Decimal) -> Self {
        Self {
            generators: GeneratorRepository::new(pool),
            gst_rate,
        }
    }

    async fn catalog(&self) -> Result<PriceCatalog, AppError> {
        Ok(PriceCatalog::new(self.generators.list().await?))
    }

    pub async fn estimate(
        &self,
        request: EstimateRequest,
    ) -> Result<ApiResponse<EstimateResponse>, AppError> {
        request.validate()?;

        let catalog = self.catalog().await?;
        let estimate = PricingService::estimate_booking(&request.generators, &catalog);
        let totals = PricingService::apply_tax(estimate.grand_total, self.gst_rate);

        Ok(ApiResponse::success(EstimateResponse {
            lines: estimate.lines,
            grand_total: estimate.grand_total,
            tax: totals.tax,
            estimated_cost: totals.total,
        }))
    }

    pub async fn cart(&self, request: CartRequest) -> Result<ApiResponse<CartCheckout>, AppError> {
        request.validate()?;

        let catalog = self.catalog().await?;
        let checkout = PricingService::checkout_cart(&request.items, &catalog, self.gst_rate);

        Ok(ApiResponse::success(checkout))
    }
}
