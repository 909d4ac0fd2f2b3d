//! CRUD de generadores, vehículos y add-ons

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::addon_controller::AddonController;
use crate::controllers::generator_controller::GeneratorController;
use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::addon_dto::{CreateAddonRequest, UpdateAddonRequest};
use crate::dto::generator_dto::{CreateGeneratorRequest, UpdateGeneratorRequest};
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::dto::ApiResponse;
use crate::models::addon::Addon;
use crate::models::generator::Generator;
use crate::models::vehicle::Vehicle;
use crate::state::AppState;
use crate::utils::errors::AppError;

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

pub fn create_generator_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_generators).post(create_generator))
        .route(
            "/:id",
            get(get_generator).put(update_generator).delete(delete_generator),
        )
}

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
}

pub fn create_addon_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addons).post(create_addon))
        .route("/:id", get(get_addon).put(update_addon).delete(delete_addon))
}

// Generadores

async fn list_generators(State(state): State<AppState>) -> ApiResult<Vec<Generator>> {
    Ok(Json(GeneratorController::new(state.pool).list().await?))
}

async fn get_generator(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Generator> {
    Ok(Json(GeneratorController::new(state.pool).get_by_id(id).await?))
}

async fn create_generator(
    State(state): State<AppState>,
    Json(request): Json<CreateGeneratorRequest>,
) -> ApiResult<Generator> {
    Ok(Json(GeneratorController::new(state.pool).create(request).await?))
}

async fn update_generator(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGeneratorRequest>,
) -> ApiResult<Generator> {
    Ok(Json(GeneratorController::new(state.pool).update(id, request).await?))
}

async fn delete_generator(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    Ok(Json(GeneratorController::new(state.pool).delete(id).await?))
}

// Vehículos

async fn list_vehicles(State(state): State<AppState>) -> ApiResult<Vec<Vehicle>> {
    Ok(Json(VehicleController::new(state.pool).list().await?))
}

async fn get_vehicle(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Vehicle> {
    Ok(Json(VehicleController::new(state.pool).get_by_id(id).await?))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> ApiResult<Vehicle> {
    Ok(Json(VehicleController::new(state.pool).create(request).await?))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> ApiResult<Vehicle> {
    Ok(Json(VehicleController::new(state.pool).update(id, request).await?))
}

async fn delete_vehicle(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    Ok(Json(VehicleController::new(state.pool).delete(id).await?))
}

// Add-ons

async fn list_addons(State(state): State<AppState>) -> ApiResult<Vec<Addon>> {
    Ok(Json(AddonController::new(state.pool).list().await?))
}

async fn get_addon(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Addon> {
    Ok(Json(AddonController::new(state.pool).get_by_id(id).await?))
}

async fn create_addon(
    State(state): State<AppState>,
    Json(request): Json<CreateAddonRequest>,
) -> ApiResult<Addon> {
    Ok(Json(AddonController::new(state.pool).create(request).await?))
}

async fn update_addon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAddonRequest>,
) -> ApiResult<Addon> {
    Ok(Json(AddonController::new(state.pool).update(id, request).await?))
}

async fn delete_addon(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<()> {
    Ok(Json(AddonController::new(state.pool).delete(id).await?))
}
