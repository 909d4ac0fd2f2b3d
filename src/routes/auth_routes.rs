use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};

use crate::controllers::auth_controller::AuthController;
use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserFilters, UserResponse};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}

pub fn create_user_router() -> Router<AppState> {
    Router::new().route("/", get(list_users).post(create_user))
}

fn controller(state: &AppState) -> AuthController {
    AuthController::new(state.pool.clone(), state.jwt.clone())
}

async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    Ok(Json(controller(&state).register(request).await?))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    Ok(Json(controller(&state).login(request).await?))
}

async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    Ok(Json(controller(&state).me(&user).await?))
}

async fn list_users(
    State(state): State<AppState>,
    Query(filters): Query<UserFilters>,
) -> Result<Json<ApiResponse<Vec<UserResponse>>>, AppError> {
    Ok(Json(controller(&state).list_users(filters).await?))
}

async fn create_user(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    Ok(Json(controller(&state).create_user(request).await?))
}
