use std::path::PathBuf;

use chrono::{FixedOffset, Offset, Utc};

use crate::auth::JwtConfig;
use crate::utils::time::parse_utc_offset;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | WORK_DIR | ./data | database, images, logs |
/// | HTTP_PORT | 3000 | |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | LOG_LEVEL | info | ignored when RUST_LOG is set |
/// | JWT_SECRET | dev value | required outside development |
/// | JWT_EXPIRATION_MINUTES | 1440 | |
/// | JWT_ISSUER / JWT_AUDIENCE | foa-server / foa-clients | |
/// | PAYSTACK_SECRET_KEY | dev value | required outside development |
/// | PAYSTACK_PUBLIC_KEY | empty | handed to the payment popup |
/// | PAYSTACK_BASE_URL | https://api.paystack.co | |
/// | PAYMENT_CURRENCY | GHS | |
/// | PAYMENT_TIMEOUT_SECS | 15 | outbound verify timeout |
/// | BUSINESS_UTC_OFFSET | +00:00 | order time, yearly/monthly analytics |
/// | STAFF_DEFAULT_PASSWORD | 123456 | initial password for new staff |
/// | DASHBOARD_ROLES | super | comma separated staff roles allowed to sign in |
/// | BOOTSTRAP_ADMIN_EMAIL / _PASSWORD | unset | seed a super account on an empty roster |
/// | REQUEST_TIMEOUT_MS | 30000 | |
/// | MAX_UPLOAD_BYTES | 5242880 | |
/// | PDF_FONT_PATH | unset | TrueType font embedded in PDF exports (Helvetica otherwise) |
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: PathBuf,
    pub http_port: u16,
    pub environment: String,
    pub log_level: String,
    pub jwt: JwtConfig,
    pub paystack_secret_key: String,
    pub paystack_public_key: String,
    pub paystack_base_url: String,
    pub currency: String,
    pub payment_timeout_secs: u64,
    pub business_offset: FixedOffset,
    pub staff_default_password: String,
    /// Staff roles allowed through the dashboard login
    pub dashboard_roles: Vec<String>,
    pub bootstrap_admin: Option<(String, String)>,
    pub request_timeout_ms: u64,
    pub max_upload_bytes: usize,
    pub pdf_font_path: Option<PathBuf>,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let offset_raw = std::env::var("BUSINESS_UTC_OFFSET").unwrap_or_else(|_| "+00:00".into());
        let business_offset = parse_utc_offset(&offset_raw)
            .ok_or_else(|| format!("BUSINESS_UTC_OFFSET is not a valid offset: {offset_raw}"))?;

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").ok().filter(|s| !s.is_empty()),
        ) {
            (Some(email), Some(password)) => Some((email, password)),
            _ => None,
        };

        Ok(Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "./data".into())
                .into(),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            jwt: JwtConfig {
                secret: Self::require_secret("JWT_SECRET", &environment)?,
                expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1440),
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "foa-server".into()),
                audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "foa-clients".into()),
            },
            paystack_secret_key: Self::require_secret("PAYSTACK_SECRET_KEY", &environment)?,
            paystack_public_key: std::env::var("PAYSTACK_PUBLIC_KEY").unwrap_or_default(),
            paystack_base_url: std::env::var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|_| "https://api.paystack.co".into()),
            currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "GHS".into()),
            payment_timeout_secs: std::env::var("PAYMENT_TIMEOUT_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(15),
            business_offset,
            staff_default_password: std::env::var("STAFF_DEFAULT_PASSWORD")
                .unwrap_or_else(|_| "123456".into()),
            dashboard_roles: parse_roles(
                &std::env::var("DASHBOARD_ROLES").unwrap_or_else(|_| "super".into()),
            ),
            bootstrap_admin,
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5 * 1024 * 1024),
            pdf_font_path: std::env::var("PDF_FONT_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
            environment,
        })
    }

    /// Development defaults rooted at `work_dir`, no environment lookups
    pub fn development(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 3000,
            environment: "development".into(),
            log_level: "info".into(),
            jwt: JwtConfig {
                secret: "dev-JWT_SECRET-not-for-production".into(),
                expiration_minutes: 1440,
                issuer: "foa-server".into(),
                audience: "foa-clients".into(),
            },
            paystack_secret_key: "dev-PAYSTACK_SECRET_KEY-not-for-production".into(),
            paystack_public_key: "pk_test_dev".into(),
            paystack_base_url: "https://api.paystack.co".into(),
            currency: "GHS".into(),
            payment_timeout_secs: 15,
            business_offset: Utc.fix(),
            staff_default_password: "123456".into(),
            dashboard_roles: vec!["super".into()],
            bootstrap_admin: None,
            request_timeout_ms: 30000,
            max_upload_bytes: 5 * 1024 * 1024,
            pdf_font_path: None,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.work_dir.join("foa.redb")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.work_dir.join("images")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_roles(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_secret_in_development() {
        let val = Config::require_secret("FOA_TEST_UNSET_SECRET", "development").unwrap();
        assert_eq!(val, "dev-FOA_TEST_UNSET_SECRET-not-for-production");
    }

    #[test]
    fn test_require_secret_in_production() {
        assert!(Config::require_secret("FOA_TEST_UNSET_SECRET", "production").is_err());
    }

    #[test]
    fn test_parse_roles() {
        assert_eq!(parse_roles("super, admin,,"), vec!["super", "admin"]);
        assert!(parse_roles("").is_empty());
    }

    #[test]
    fn test_development_paths() {
        let config = Config::development("/tmp/foa");
        assert!(config.is_development());
        assert_eq!(config.database_path(), PathBuf::from("/tmp/foa/foa.redb"));
        assert_eq!(config.images_dir(), PathBuf::from("/tmp/foa/images"));
        assert_eq!(config.dashboard_roles, vec!["super"]);
        assert!(config.pdf_font_path.is_none());
    }
}
