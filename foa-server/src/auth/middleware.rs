//! Authentication middleware
//!
//! Axum middleware for JWT authentication and permission checks.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Routes reachable without a token
///
/// Matched against the request path; `GET`-only entries are checked by
/// [`is_public_route`].
const PUBLIC_ROUTES: &[&str] = &[
    "/api/auth/signup",
    "/api/auth/login",
    "/api/auth/staff/login",
    "/api/payments/paystack/webhook",
];

/// Read-only catalog and image routes open to anonymous browsing
const PUBLIC_GET_PREFIXES: &[&str] = &[
    "/api/foods",
    "/api/categories",
    "/api/locations/active",
    "/api/image/",
];

fn is_public_route(method: &http::Method, path: &str) -> bool {
    if PUBLIC_ROUTES.contains(&path) {
        return true;
    }
    *method == http::Method::GET
        && path != "/api/image/upload"
        && PUBLIC_GET_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Authentication middleware
///
/// Extracts and validates the JWT from `Authorization: Bearer <token>` and
/// inserts a [`CurrentUser`] into the request extensions.
///
/// Skipped for:
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths (health, 404s)
/// - the public routes above
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::not_authenticated());
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// Permission middleware
///
/// ```ignore
/// Router::new()
///     .route("/api/admin/foods", post(handler::create))
///     .layer(middleware::from_fn(require_permission("catalog:write")));
/// ```
///
/// Missing permission returns 403.
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or_else(AppError::not_authenticated)?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id.clone(),
                    role = user.role.clone(),
                    required_permission = permission
                );
                return Err(AppError::permission_denied(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn public_routes() {
        assert!(is_public_route(&Method::POST, "/api/auth/login"));
        assert!(is_public_route(&Method::POST, "/api/payments/paystack/webhook"));
        assert!(is_public_route(&Method::GET, "/api/foods"));
        assert!(is_public_route(&Method::GET, "/api/foods/abc/toppings"));
        assert!(is_public_route(&Method::GET, "/api/image/abc.jpg"));
        assert!(!is_public_route(&Method::POST, "/api/image/upload"));
        assert!(!is_public_route(&Method::GET, "/api/image/upload"));
        assert!(!is_public_route(&Method::GET, "/api/cart"));
        assert!(!is_public_route(&Method::GET, "/api/admin/foods"));
        assert!(!is_public_route(&Method::GET, "/api/auth/me"));
    }
}
