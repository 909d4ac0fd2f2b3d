use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    AssignBookingRequest, BookingFilters, CartCheckoutRequest, CreateBookingRequest,
    UpdateBookingStatusRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::Booking;
use crate::services::lifecycle_service::DriverAction;
use crate::state::AppState;
use crate::utils::errors::AppError;

type BookingResult = Result<Json<ApiResponse<Booking>>, AppError>;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/checkout", post(checkout_cart))
        .route("/mine", get(list_my_bookings))
        .route("/:id", get(get_booking))
        .route("/:id/status", put(update_status))
        .route("/:id/assignment", put(assign))
        .route("/:id/cancel", post(cancel))
}

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_driver_bookings))
        .route("/bookings/:id/lines/:index/:action", post(driver_action))
}

fn controller(state: &AppState) -> BookingController {
    BookingController::new(state.pool.clone(), state.config.gst_rate)
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookingRequest>,
) -> BookingResult {
    Ok(Json(controller(&state).create_from_form(&user, request).await?))
}

async fn checkout_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CartCheckoutRequest>,
) -> BookingResult {
    Ok(Json(controller(&state).checkout_cart(&user, request).await?))
}

async fn list_bookings(
    State(state): State<AppState>,
    Query(filters): Query<BookingFilters>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    Ok(Json(controller(&state).list(filters).await?))
}

async fn list_my_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    Ok(Json(controller(&state).list_mine(&user).await?))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> BookingResult {
    Ok(Json(controller(&state).get(&user, id).await?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateBookingStatusRequest>,
) -> BookingResult {
    Ok(Json(controller(&state).update_status(id, request).await?))
}

async fn assign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignBookingRequest>,
) -> BookingResult {
    Ok(Json(controller(&state).assign(id, request).await?))
}

async fn cancel(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> BookingResult {
    Ok(Json(controller(&state).cancel(&user, id).await?))
}

async fn list_driver_bookings(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    Ok(Json(controller(&state).list_for_driver(&user).await?))
}

async fn driver_action(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path((id, index, action)): Path<(Uuid, usize, DriverAction)>,
) -> BookingResult {
    Ok(Json(controller(&state).driver_action(&user, id, index, action).await?))
}
