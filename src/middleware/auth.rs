//! Middleware de autenticación y autorización
//!
//! Una única tabla asocia (método, ruta) con los roles permitidos y se evalúa
//! una vez por request. Las rutas públicas no requieren token. HEAD se evalúa
//! como GET. Bajo `/api/` una ruta que no está en la tabla se rechaza con 404
//! sin llegar al handler.

use axum::{
    extract::{OriginalUri, Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::state::AppState;
use crate::utils::errors::AppError;

/// Usuario autenticado que se inyecta en las requests
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[derive(Debug, PartialEq)]
pub enum Access {
    Public,
    Roles(&'static [UserRole]),
}

struct RouteRule {
    method: Method,
    pattern: &'static str,
    access: Access,
}

const ADMIN: &[UserRole] = &[UserRole::Admin];
const DRIVER: &[UserRole] = &[UserRole::Driver];
const CUSTOMER: &[UserRole] = &[UserRole::User, UserRole::Admin];
const ANY_ROLE: &[UserRole] = &[UserRole::Admin, UserRole::Driver, UserRole::User];

macro_rules! rule {
    ($method:ident, $pattern:expr, public) => {
        RouteRule { method: Method::$method, pattern: $pattern, access: Access::Public }
    };
    ($method:ident, $pattern:expr, $roles:expr) => {
        RouteRule { method: Method::$method, pattern: $pattern, access: Access::Roles($roles) }
    };
}

/// Tabla de rutas: la primera coincidencia gana
static ROUTE_TABLE: &[RouteRule] = &[
    rule!(GET, "/health", public),
    // Auth
    rule!(POST, "/api/auth/login", public),
    rule!(POST, "/api/auth/register", public),
    rule!(GET, "/api/auth/me", ANY_ROLE),
    // Catálogo
    rule!(GET, "/api/generators", public),
    rule!(GET, "/api/generators/:id", public),
    rule!(POST, "/api/generators", ADMIN),
    rule!(PUT, "/api/generators/:id", ADMIN),
    rule!(DELETE, "/api/generators/:id", ADMIN),
    rule!(GET, "/api/addons", public),
    rule!(GET, "/api/addons/:id", public),
    rule!(POST, "/api/addons", ADMIN),
    rule!(PUT, "/api/addons/:id", ADMIN),
    rule!(DELETE, "/api/addons/:id", ADMIN),
    // Precios
    rule!(POST, "/api/pricing/estimate", public),
    rule!(POST, "/api/pricing/cart", public),
    // Reservas
    rule!(POST, "/api/bookings", CUSTOMER),
    rule!(POST, "/api/bookings/checkout", CUSTOMER),
    rule!(GET, "/api/bookings/mine", CUSTOMER),
    rule!(GET, "/api/bookings", ADMIN),
    rule!(GET, "/api/bookings/:id", ANY_ROLE),
    rule!(PUT, "/api/bookings/:id/status", ADMIN),
    rule!(PUT, "/api/bookings/:id/assignment", ADMIN),
    rule!(POST, "/api/bookings/:id/cancel", CUSTOMER),
    // Conductor
    rule!(GET, "/api/driver/bookings", DRIVER),
    rule!(POST, "/api/driver/bookings/:id/lines/:index/:action", DRIVER),
    // Flota
    rule!(GET, "/api/vehicles", ADMIN),
    rule!(POST, "/api/vehicles", ADMIN),
    rule!(GET, "/api/vehicles/:id", ADMIN),
    rule!(PUT, "/api/vehicles/:id", ADMIN),
    rule!(DELETE, "/api/vehicles/:id", ADMIN),
    rule!(GET, "/api/users", ADMIN),
    rule!(POST, "/api/users", ADMIN),
    // Fleetop
    rule!(POST, "/api/fleetop/token", ADMIN),
    rule!(POST, "/api/fleetop/ignition-summary", ADMIN),
    rule!(POST, "/api/fleetop/hours", ADMIN),
];

fn pattern_matches(pattern: &str, path: &str) -> bool {
    let path = path.trim_end_matches('/');
    let mut pattern_segments = pattern.split('/');
    let mut path_segments = path.split('/');

    loop {
        match (pattern_segments.next(), path_segments.next()) {
            (None, None) => return true,
            (Some(p), Some(s)) if p.starts_with(':') && !s.is_empty() => continue,
            (Some(p), Some(s)) if p == s => continue,
            _ => return false,
        }
    }
}

/// Regla de acceso para una request, si la ruta está en la tabla
pub fn route_access(method: &Method, path: &str) -> Option<&'static Access> {
    // axum responde HEAD con el handler de GET
    let method = if *method == Method::HEAD {
        Method::GET
    } else {
        method.clone()
    };

    ROUTE_TABLE
        .iter()
        .find(|rule| rule.method == method && pattern_matches(rule.pattern, path))
        .map(|rule| &rule.access)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Middleware de autorización por rol
pub async fn authorize(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let roles = match route_access(request.method(), &path) {
        Some(Access::Roles(roles)) => *roles,
        Some(Access::Public) => return Ok(next.run(request).await),
        None if path.starts_with("/api/") => {
            debug!("Sin regla para {} {}", request.method(), path);
            return Err(AppError::NotFound(format!(
                "No route for {} {}",
                request.method(),
                path
            )));
        }
        None => return Ok(next.run(request).await),
    };

    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;
    let claims = state.jwt.validate_token(token)?;

    if !roles.contains(&claims.role) {
        debug!(
            "Rol {} sin acceso a {} {}",
            claims.role.as_str(),
            request.method(),
            path
        );
        return Err(AppError::Forbidden(format!(
            "Role '{}' cannot access this resource",
            claims.role.as_str()
        )));
    }

    let user = AuthenticatedUser {
        user_id: claims.user_id()?,
        role: claims.role,
    };
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles_for(method: Method, path: &str) -> Option<&'static [UserRole]> {
        match route_access(&method, path) {
            Some(Access::Roles(roles)) => Some(*roles),
            _ => None,
        }
    }

    #[test]
    fn test_pattern_matching() {
        assert!(pattern_matches("/api/bookings/:id", "/api/bookings/123"));
        assert!(pattern_matches("/api/bookings/:id", "/api/bookings/123/"));
        assert!(!pattern_matches("/api/bookings/:id", "/api/bookings"));
        assert!(!pattern_matches("/api/bookings/:id", "/api/bookings/123/status"));
        assert!(pattern_matches(
            "/api/driver/bookings/:id/lines/:index/:action",
            "/api/driver/bookings/abc/lines/0/start"
        ));
    }

    #[test]
    fn test_public_routes() {
        assert_eq!(route_access(&Method::GET, "/health"), Some(&Access::Public));
        assert_eq!(route_access(&Method::GET, "/api/generators"), Some(&Access::Public));
        assert_eq!(route_access(&Method::POST, "/api/pricing/cart"), Some(&Access::Public));
        assert_eq!(route_access(&Method::POST, "/api/auth/login"), Some(&Access::Public));
    }

    #[test]
    fn test_admin_routes_exclude_drivers() {
        let roles = roles_for(Method::PUT, "/api/bookings/42/status").unwrap();
        assert_eq!(roles, &[UserRole::Admin]);

        let roles = roles_for(Method::POST, "/api/generators").unwrap();
        assert!(!roles.contains(&UserRole::Driver));

        let roles = roles_for(Method::POST, "/api/fleetop/hours").unwrap();
        assert!(!roles.contains(&UserRole::User));
    }

    #[test]
    fn test_driver_routes() {
        let roles = roles_for(Method::POST, "/api/driver/bookings/1/lines/0/pause").unwrap();
        assert_eq!(roles, &[UserRole::Driver]);
        assert!(roles_for(Method::GET, "/api/bookings").unwrap() == &[UserRole::Admin]);
    }

    #[test]
    fn test_static_segment_wins_over_param() {
        let roles = roles_for(Method::GET, "/api/bookings/mine").unwrap();
        assert!(roles.contains(&UserRole::User));
        assert!(!roles.contains(&UserRole::Driver));
    }

    #[test]
    fn test_head_uses_get_rules() {
        assert_eq!(roles_for(Method::HEAD, "/api/users"), Some(ADMIN));
        assert_eq!(roles_for(Method::HEAD, "/api/bookings"), Some(ADMIN));
        assert_eq!(route_access(&Method::HEAD, "/health"), Some(&Access::Public));
        assert_eq!(route_access(&Method::GET, "/api/addons/7"), Some(&Access::Public));
    }

    #[test]
    fn test_unknown_route_has_no_rule() {
        assert!(route_access(&Method::GET, "/api/unknown").is_none());
        assert!(route_access(&Method::PATCH, "/api/generators/1").is_none());
    }
}
