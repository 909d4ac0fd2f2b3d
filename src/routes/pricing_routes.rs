use axum::{extract::State, routing::post, Json, Router};

use crate::controllers::pricing_controller::PricingController;
use crate::dto::pricing_dto::{CartCheckout, CartRequest, EstimateRequest, EstimateResponse};
use crate::dto::ApiResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_pricing_router() -> Router<AppState> {
    Router::new()
        .route("/estimate", post(estimate))
        .route("/cart", post(cart))
}

async fn estimate(
    State(state): State<AppState>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<ApiResponse<EstimateResponse>>, AppError> {
    let controller = PricingController::new(state.pool.clone(), state.config.gst_rate);
    Ok(Json(controller.estimate(request).await?))
}

async fn cart(
    State(state): State<AppState>,
    Json(request): Json<CartRequest>,
) -> Result<Json<ApiResponse<CartCheckout>>, AppError> {
    let controller = PricingController::new(state.pool.clone(), state.config.gst_rate);
    Ok(Json(controller.cart(request).await?))
}
