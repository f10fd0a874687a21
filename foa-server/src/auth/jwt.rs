//! JWT token service
//!
//! Issues and validates the session tokens returned by the customer and
//! staff login endpoints.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::error::AppError;
use shared::models::SessionUser;
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret
    pub secret: String,
    /// Token lifetime (minutes)
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account uid (Subject)
    pub sub: String,
    /// Profile document id (customer id or staff id)
    pub pid: String,
    pub email: String,
    pub name: String,
    /// `customer`, `admin`, `super` or `deliveryGuy`
    pub role: String,
    /// Comma separated permission list
    pub permissions: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Token generation failed: {0}")]
    GenerationFailed(String),
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::ExpiredToken => AppError::token_expired(),
            JwtError::GenerationFailed(msg) => AppError::internal(msg),
            _ => AppError::invalid_token("Invalid token"),
        }
    }
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a token for a signed-in user; returns the token and its expiry (unix seconds)
    pub fn generate_token(&self, user: &SessionUser) -> Result<(String, i64), JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user.uid.clone(),
            pid: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            permissions: user.permissions.join(","),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))?;
        Ok((token, claims.exp))
    }

    /// Validate and decode a token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

/// The authenticated caller, injected into request extensions by `require_auth`
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Profile document id
    pub id: String,
    /// Account uid
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        let permissions = if claims.permissions.is_empty() {
            vec![]
        } else {
            claims
                .permissions
                .split(',')
                .map(|s| s.to_string())
                .collect()
        };

        Self {
            id: claims.pid,
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            role: claims.role,
            permissions,
        }
    }
}

impl CurrentUser {
    pub fn is_customer(&self) -> bool {
        self.role == super::permissions::CUSTOMER_ROLE
    }

    /// Check a permission
    ///
    /// - `"all"` grants everything
    /// - `"orders:*"` matches `"orders:read"`, `"orders:write"`, ...
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| {
            if p == "all" || p == permission {
                return true;
            }
            if let Some(prefix) = p.strip_suffix(":*") {
                permission.starts_with(&format!("{}:", prefix))
            } else {
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig {
            secret: "test-secret-at-least-32-bytes-long!!".into(),
            expiration_minutes: 60,
            issuer: "foa-server".into(),
            audience: "foa-clients".into(),
        })
    }

    fn session_user() -> SessionUser {
        SessionUser {
            id: "cust-1".into(),
            uid: "uid-1".into(),
            email: "ama@example.com".into(),
            name: "Ama Mensah".into(),
            role: "customer".into(),
            permissions: vec!["cart:*".into(), "orders:own".into()],
        }
    }

    #[test]
    fn test_jwt_generation_and_validation() {
        let service = service();
        let (token, exp) = service.generate_token(&session_user()).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.pid, "cust-1");
        assert_eq!(claims.role, "customer");
        assert_eq!(claims.permissions, "cart:*,orders:own");
        assert_eq!(claims.exp, exp);

        let user = CurrentUser::from(claims);
        assert_eq!(user.id, "cust-1");
        assert!(user.is_customer());
        assert!(user.has_permission("cart:write"));
        assert!(user.has_permission("orders:own"));
        assert!(!user.has_permission("orders:read"));
    }

    #[test]
    fn test_rejects_token_from_other_secret() {
        let (token, _) = service().generate_token(&session_user()).unwrap();
        let other = JwtService::with_config(JwtConfig {
            secret: "another-secret-at-least-32-bytes-long".into(),
            ..service().config
        });
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_expired_token() {
        let expired = JwtService::with_config(JwtConfig {
            expiration_minutes: -10,
            ..service().config
        });
        let (token, _) = expired.generate_token(&session_user()).unwrap();
        assert!(matches!(
            expired.validate_token(&token),
            Err(JwtError::ExpiredToken)
        ));
    }

    #[test]
    fn test_all_permission() {
        let user = CurrentUser {
            id: "s1".into(),
            uid: "u1".into(),
            email: "boss@example.com".into(),
            name: "Boss".into(),
            role: "super".into(),
            permissions: vec!["all".into()],
        };
        assert!(!user.is_customer());
        assert!(user.has_permission("staff:write"));
        assert!(user.has_permission("nothing:here"));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}
