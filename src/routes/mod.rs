pub mod auth_routes;
pub mod booking_routes;
pub mod catalog_routes;
pub mod fleetop_routes;
pub mod pricing_routes;

use axum::{middleware::from_fn_with_state, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::{authorize, cors_layer};
use crate::state::AppState;

/// Router completo de la API
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health))
        .nest("/api/auth", auth_routes::create_auth_router())
        .nest("/api/users", auth_routes::create_user_router())
        .nest("/api/pricing", pricing_routes::create_pricing_router())
        .nest("/api/bookings", booking_routes::create_booking_router())
        .nest("/api/driver", booking_routes::create_driver_router())
        .nest("/api/generators", catalog_routes::create_generator_router())
        .nest("/api/vehicles", catalog_routes::create_vehicle_router())
        .nest("/api/addons", catalog_routes::create_addon_router())
        .nest("/api/fleetop", fleetop_routes::create_fleetop_router())
        .layer(from_fn_with_state(state.clone(), authorize))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "generator-rental",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
