//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // 404 Not Found
            Self::NotFound
            | Self::CustomerNotFound
            | Self::MessageNotFound
            | Self::OrderNotFound
            | Self::CartLineNotFound
            | Self::CheckoutNotFound
            | Self::FoodNotFound
            | Self::CategoryNotFound
            | Self::ToppingNotFound
            | Self::LocationNotFound
            | Self::StaffNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmailAlreadyRegistered
            | Self::CategoryNameExists
            | Self::LocationNameExists
            | Self::StaffEmailExists
            | Self::PaymentAmountMismatch => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::DashboardAccessDenied
            | Self::AccountDisabled
            | Self::ProfileNotFound
            | Self::StaffCannotDeleteSelf => StatusCode::FORBIDDEN,

            // 402 Payment Required
            Self::PaymentInsufficientAmount | Self::PaymentNotVerified => {
                StatusCode::PAYMENT_REQUIRED
            }

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 429 Too Many Requests
            Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway (upstream payment provider)
            Self::PaymentProviderError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::TimeoutError => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ImageProcessingFailed
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
