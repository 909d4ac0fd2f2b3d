use sqlx::PgPool;
use std::sync::Arc;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserFilters, UserResponse};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::user::UserRole;
use crate::repositories::user_repository::UserRepository;
use crate::services::auth_service::AuthService;
use crate::services::jwt_service::JwtService;
use crate::utils::errors::{not_found_error, AppError};

pub struct AuthController {
    service: AuthService,
    users: UserRepository,
}

impl AuthController {
    pub fn new(pool: PgPool, jwt: Arc<JwtService>) -> Self {
        Self {
            service: AuthService::new(pool.clone(), jwt),
            users: UserRepository::new(pool),
        }
    }

    /// Registro público: siempre rol `user`
    pub async fn register(&self, request: RegisterRequest) -> Result<ApiResponse<UserResponse>, AppError> {
        let user = self.service.register(request, UserRole::User).await?;
        Ok(ApiResponse::success_with_message(user, "Account created"))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        self.service.login(request).await
    }

    pub async fn me(&self, user: &AuthenticatedUser) -> Result<ApiResponse<UserResponse>, AppError> {
        let found = self
            .users
            .find_by_id(user.user_id)
            .await?
            .ok_or_else(|| not_found_error("User", &user.user_id.to_string()))?;

        Ok(ApiResponse::success(found.into()))
    }

    /// Alta de conductores o admins por un admin; por defecto conductor
    pub async fn create_user(&self, request: RegisterRequest) -> Result<ApiResponse<UserResponse>, AppError> {
        let role = request.role.unwrap_or(UserRole::Driver);
        let user = self.service.register(request, role).await?;
        Ok(ApiResponse::success_with_message(user, "User created"))
    }

    pub async fn list_users(&self, filters: UserFilters) -> Result<ApiResponse<Vec<UserResponse>>, AppError> {
        let users = self.users.list(filters.role).await?;
        Ok(ApiResponse::success(users.into_iter().map(UserResponse::from).collect()))
    }
}
