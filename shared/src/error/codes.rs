//! Unified error codes for the FOA platform
//!
//! Error codes are shared by the server and both web clients.
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Customer / account / messaging errors
//! - 4xxx: Cart and order errors
//! - 5xxx: Payment errors
//! - 6xxx: Catalog errors
//! - 7xxx: Location errors
//! - 8xxx: Staff errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled (status = false)
    AccountDisabled = 1005,
    /// An account with this email already exists
    EmailAlreadyRegistered = 1006,
    /// Password too short
    PasswordTooShort = 1007,
    /// Too many attempts
    TooManyAttempts = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Staff role may not use the dashboard
    DashboardAccessDenied = 2003,

    // ==================== 3xxx: Customer ====================
    /// Customer not found
    CustomerNotFound = 3001,
    /// Authenticated account has no matching profile document
    ProfileNotFound = 3002,
    /// Message not found
    MessageNotFound = 3101,
    /// Staff message has no recipients
    MessageRecipientsRequired = 3102,

    // ==================== 4xxx: Cart / Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Cart is empty
    CartEmpty = 4002,
    /// Cart line not found
    CartLineNotFound = 4003,
    /// Quantity out of range
    InvalidQuantity = 4004,
    /// Operation only valid for pickup orders
    OrderNotPickup = 4005,
    /// Pickup time is not a valid HH:MM value
    PickupTimeInvalid = 4006,
    /// Delivery orders need a location
    LocationRequired = 4007,
    /// Pending checkout not found
    CheckoutNotFound = 4008,

    // ==================== 5xxx: Payment ====================
    /// Insufficient payment amount
    PaymentInsufficientAmount = 5002,
    /// Payment could not be verified with the provider
    PaymentNotVerified = 5003,
    /// Cart total changed after the payment was initialized
    PaymentAmountMismatch = 5004,
    /// Webhook signature mismatch
    PaymentSignatureInvalid = 5005,
    /// Payment provider returned an error
    PaymentProviderError = 5006,

    // ==================== 6xxx: Catalog ====================
    /// Food not found
    FoodNotFound = 6001,
    /// Food has invalid price
    FoodInvalidPrice = 6002,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category name already exists
    CategoryNameExists = 6102,
    /// Topping not found
    ToppingNotFound = 6201,
    /// Topping does not apply to the selected food
    ToppingNotAvailable = 6202,

    // ==================== 65xx: File Upload ====================
    /// File size exceeds limit
    FileTooLarge = 6501,
    /// File format not supported
    UnsupportedFileFormat = 6502,
    /// Invalid image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// No filename provided
    NoFilename = 6506,
    /// Invalid file extension
    InvalidFileExtension = 6507,
    /// Image processing failed
    ImageProcessingFailed = 6508,
    /// File storage failed
    FileStorageFailed = 6509,

    // ==================== 7xxx: Location ====================
    /// Location not found
    LocationNotFound = 7001,
    /// Location is inactive
    LocationInactive = 7002,
    /// Location name already exists
    LocationNameExists = 7003,

    // ==================== 8xxx: Staff ====================
    /// Staff member not found
    StaffNotFound = 8001,
    /// Staff email already exists
    StaffEmailExists = 8002,
    /// Cannot delete own account
    StaffCannotDeleteSelf = 8003,
    /// Delivery staff need an assigned location
    DeliveryLocationRequired = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Operation timed out
    TimeoutError = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => {
                "Your account is currently inactive. Please contact an administrator."
            }
            ErrorCode::EmailAlreadyRegistered => "An account with this email already exists",
            ErrorCode::PasswordTooShort => "Password must be at least 6 characters",
            ErrorCode::TooManyAttempts => "Too many attempts, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::DashboardAccessDenied => {
                "You don't have permission to access the dashboard."
            }

            // Customer
            ErrorCode::CustomerNotFound => "Customer not found",
            ErrorCode::ProfileNotFound => "User profile not found",
            ErrorCode::MessageNotFound => "Message not found",
            ErrorCode::MessageRecipientsRequired => "Select at least one customer",

            // Cart / Order
            ErrorCode::OrderNotFound => "Order not found",
            ErrorCode::CartEmpty => "Cart is empty",
            ErrorCode::CartLineNotFound => "Cart item not found",
            ErrorCode::InvalidQuantity => "Quantity is out of range",
            ErrorCode::OrderNotPickup => "Order is not a pickup order",
            ErrorCode::PickupTimeInvalid => "Pickup time must be HH:MM",
            ErrorCode::LocationRequired => "Delivery orders require a location",
            ErrorCode::CheckoutNotFound => "Checkout not found",

            // Payment
            ErrorCode::PaymentInsufficientAmount => "Insufficient payment amount",
            ErrorCode::PaymentNotVerified => "Payment could not be verified",
            ErrorCode::PaymentAmountMismatch => "Cart total changed after payment started",
            ErrorCode::PaymentSignatureInvalid => "Invalid payment signature",
            ErrorCode::PaymentProviderError => "Payment provider error",

            // Catalog
            ErrorCode::FoodNotFound => "Food not found",
            ErrorCode::FoodInvalidPrice => "Food has invalid price",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::ToppingNotFound => "Topping not found",
            ErrorCode::ToppingNotAvailable => "Topping is not available for this food",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::NoFilename => "No filename provided",
            ErrorCode::InvalidFileExtension => "Invalid file extension",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Location
            ErrorCode::LocationNotFound => "Location not found",
            ErrorCode::LocationInactive => "Location is not active",
            ErrorCode::LocationNameExists => "Location name already exists",

            // Staff
            ErrorCode::StaffNotFound => "Staff member not found",
            ErrorCode::StaffEmailExists => "Staff email already exists",
            ErrorCode::StaffCannotDeleteSelf => "Cannot delete own account",
            ErrorCode::DeliveryLocationRequired => "Delivery staff need an assigned location",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Operation timed out",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when a u16 value doesn't map to any ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::EmailAlreadyRegistered),
            1007 => Ok(ErrorCode::PasswordTooShort),
            1008 => Ok(ErrorCode::TooManyAttempts),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::DashboardAccessDenied),

            // Customer
            3001 => Ok(ErrorCode::CustomerNotFound),
            3002 => Ok(ErrorCode::ProfileNotFound),
            3101 => Ok(ErrorCode::MessageNotFound),
            3102 => Ok(ErrorCode::MessageRecipientsRequired),

            // Cart / Order
            4001 => Ok(ErrorCode::OrderNotFound),
            4002 => Ok(ErrorCode::CartEmpty),
            4003 => Ok(ErrorCode::CartLineNotFound),
            4004 => Ok(ErrorCode::InvalidQuantity),
            4005 => Ok(ErrorCode::OrderNotPickup),
            4006 => Ok(ErrorCode::PickupTimeInvalid),
            4007 => Ok(ErrorCode::LocationRequired),
            4008 => Ok(ErrorCode::CheckoutNotFound),

            // Payment
            5002 => Ok(ErrorCode::PaymentInsufficientAmount),
            5003 => Ok(ErrorCode::PaymentNotVerified),
            5004 => Ok(ErrorCode::PaymentAmountMismatch),
            5005 => Ok(ErrorCode::PaymentSignatureInvalid),
            5006 => Ok(ErrorCode::PaymentProviderError),

            // Catalog
            6001 => Ok(ErrorCode::FoodNotFound),
            6002 => Ok(ErrorCode::FoodInvalidPrice),
            6101 => Ok(ErrorCode::CategoryNotFound),
            6102 => Ok(ErrorCode::CategoryNameExists),
            6201 => Ok(ErrorCode::ToppingNotFound),
            6202 => Ok(ErrorCode::ToppingNotAvailable),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6506 => Ok(ErrorCode::NoFilename),
            6507 => Ok(ErrorCode::InvalidFileExtension),
            6508 => Ok(ErrorCode::ImageProcessingFailed),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // Location
            7001 => Ok(ErrorCode::LocationNotFound),
            7002 => Ok(ErrorCode::LocationInactive),
            7003 => Ok(ErrorCode::LocationNameExists),

            // Staff
            8001 => Ok(ErrorCode::StaffNotFound),
            8002 => Ok(ErrorCode::StaffEmailExists),
            8003 => Ok(ErrorCode::StaffCannotDeleteSelf),
            8004 => Ok(ErrorCode::DeliveryLocationRequired),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9004 => Ok(ErrorCode::TimeoutError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::CartEmpty.code(), 4002);
        assert_eq!(ErrorCode::PaymentNotVerified.code(), 5003);
        assert_eq!(ErrorCode::ToppingNotAvailable.code(), 6202);
        assert_eq!(ErrorCode::LocationInactive.code(), 7002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_u16() {
        assert_eq!(ErrorCode::try_from(0), Err(InvalidErrorCode(0)));
        assert_eq!(ErrorCode::try_from(2), Ok(ErrorCode::ValidationFailed));
        assert_eq!(ErrorCode::try_from(4008), Ok(ErrorCode::CheckoutNotFound));
        assert_eq!(ErrorCode::try_from(8004), Ok(ErrorCode::DeliveryLocationRequired));
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(6203), Err(InvalidErrorCode(6203)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::OrderNotFound).unwrap();
        assert_eq!(json, "4001");

        let code: ErrorCode = serde_json::from_str("5005").unwrap();
        assert_eq!(code, ErrorCode::PaymentSignatureInvalid);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("10000");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::InvalidRequest), "5");
        assert_eq!(format!("{}", ErrorCode::FoodNotFound), "6001");
    }

    #[test]
    fn test_original_login_messages() {
        assert_eq!(
            ErrorCode::DashboardAccessDenied.message(),
            "You don't have permission to access the dashboard."
        );
        assert_eq!(
            ErrorCode::AccountDisabled.message(),
            "Your account is currently inactive. Please contact an administrator."
        );
    }

    #[test]
    fn test_every_code_roundtrips_through_u16() {
        let codes = [
            ErrorCode::ValueOutOfRange,
            ErrorCode::TooManyAttempts,
            ErrorCode::DashboardAccessDenied,
            ErrorCode::MessageRecipientsRequired,
            ErrorCode::LocationRequired,
            ErrorCode::PaymentProviderError,
            ErrorCode::FileStorageFailed,
            ErrorCode::LocationNameExists,
            ErrorCode::StaffCannotDeleteSelf,
            ErrorCode::TimeoutError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }
}
