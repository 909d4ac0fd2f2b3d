//! Servicio de autenticación
//!
//! Registro y login con contraseñas bcrypt; emite JWT con el rol del usuario.

use bcrypt::{hash, verify, DEFAULT_COST};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::auth_dto::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};
use crate::models::user::UserRole;
use crate::repositories::user_repository::UserRepository;
use crate::services::jwt_service::JwtService;
use crate::utils::errors::{conflict_error, AppError};

pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtService>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    /// Crear una cuenta con el rol indicado
    pub async fn register(
        &self,
        request: RegisterRequest,
        role: UserRole,
    ) -> Result<UserResponse, AppError> {
        request.validate()?;

        if self.users.find_by_email(&request.email).await?.is_some() {
            return Err(conflict_error("User", "email", &request.email));
        }

        let password_hash = hash(&request.password, DEFAULT_COST)?;
        let user = self
            .users
            .create(request.full_name, request.email, request.phone, role, password_hash)
            .await?;

        info!("👤 Usuario {} registrado con rol {}", user.id, role.as_str());
        Ok(user.into())
    }

    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AppError> {
        request.validate()?;

        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(invalid)?;

        if !verify(&request.password, &user.password_hash)? {
            return Err(invalid());
        }

        let access_token = self.jwt.generate_access_token(user.id, user.role)?;
        info!("🔐 Login correcto para {}", user.id);

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt.expires_in(),
            user: user.into(),
        })
    }
}
