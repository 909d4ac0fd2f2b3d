use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use crate::controllers::fleetop_controller::FleetopController;
use crate::dto::fleetop_dto::{HoursRequest, IgnitionSummaryBody};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_fleetop_router() -> Router<AppState> {
    Router::new()
        .route("/token", post(token))
        .route("/ignition-summary", post(ignition_summary))
        .route("/hours", post(hours))
}

async fn token(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let controller = FleetopController::new(state.fleetop.clone());
    Ok(Json(controller.token().await?))
}

async fn ignition_summary(
    State(state): State<AppState>,
    Json(body): Json<IgnitionSummaryBody>,
) -> Result<Json<Value>, AppError> {
    let controller = FleetopController::new(state.fleetop.clone());
    Ok(Json(controller.ignition_summary(body).await?))
}

async fn hours(
    State(state): State<AppState>,
    Json(request): Json<HoursRequest>,
) -> Result<Response, AppError> {
    let controller = FleetopController::new(state.fleetop.clone());

    let response = match controller.hours(request).await? {
        Some(summary) => Json(summary).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No ignition data" })),
        )
            .into_response(),
    };
    Ok(response)
}
