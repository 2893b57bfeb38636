//! Unified error codes for the SIAF back office
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Inventory errors (assets, categories, clients)
//! - 4xxx: Operations errors (incidents, maintenance, responsive forms)
//! - 5xxx: Requisition errors
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
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Rate limit exceeded
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1005,
    /// Password does not satisfy the password policy
    PasswordTooWeak = 1006,
    /// Current password does not match
    CurrentPasswordIncorrect = 1007,
    /// Username already taken
    UsernameExists = 1008,
    /// Email already registered
    EmailExists = 1009,
    /// User not found
    UserNotFound = 1010,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2002,

    // ==================== 3xxx: Inventory ====================
    /// Asset not found
    AssetNotFound = 3001,
    /// Asset code already exists
    AssetCodeExists = 3002,
    /// Category not found
    CategoryNotFound = 3101,
    /// Category name already exists
    CategoryNameExists = 3102,
    /// Client not found
    ClientNotFound = 3201,
    /// Client name already exists
    ClientNameExists = 3202,

    // ==================== 4xxx: Operations ====================
    /// Incident not found
    IncidentNotFound = 4001,
    /// Incident is already resolved or closed
    IncidentAlreadyClosed = 4002,
    /// A solution is required to resolve an incident
    SolutionRequired = 4003,
    /// Maintenance not found
    MaintenanceNotFound = 4101,
    /// Maintenance status does not allow this operation
    MaintenanceInvalidTransition = 4102,
    /// Responsive form not found
    ResponsiveFormNotFound = 4201,
    /// Responsive form has already been processed
    ResponsiveFormAlreadyProcessed = 4202,

    // ==================== 5xxx: Requisitions ====================
    /// Requisition not found
    RequisitionNotFound = 5001,
    /// Only pending requisitions can be changed
    RequisitionNotPending = 5002,
    /// Amount cannot be written in words
    RequisitionAmountInvalid = 5003,
    /// Amount exceeds the configured ceiling
    RequisitionAmountExceedsLimit = 5004,
    /// Requisition not found or already processed
    RequisitionAlreadyProcessed = 5005,
    /// Only approved requisitions can be completed
    RequisitionNotApproved = 5006,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Request timed out
    TimeoutError = 9003,
    /// Configuration error
    ConfigError = 9004,
    /// Database backup failed
    BackupFailed = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::TooManyRequests => "Too many requests, please try again later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordTooWeak => "Password does not meet the security requirements",
            ErrorCode::CurrentPasswordIncorrect => "Current password is incorrect",
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "Email already registered",
            ErrorCode::UserNotFound => "User not found",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",

            // Inventory
            ErrorCode::AssetNotFound => "Asset not found",
            ErrorCode::AssetCodeExists => "Asset code already exists",
            ErrorCode::CategoryNotFound => "Category not found",
            ErrorCode::CategoryNameExists => "Category name already exists",
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::ClientNameExists => "Client already exists",

            // Operations
            ErrorCode::IncidentNotFound => "Incident not found",
            ErrorCode::IncidentAlreadyClosed => "Incident is already resolved or closed",
            ErrorCode::SolutionRequired => "A solution is required",
            ErrorCode::MaintenanceNotFound => "Maintenance not found",
            ErrorCode::MaintenanceInvalidTransition => {
                "Maintenance status does not allow this operation"
            }
            ErrorCode::ResponsiveFormNotFound => "Responsive form not found",
            ErrorCode::ResponsiveFormAlreadyProcessed => {
                "Responsive form not found or already processed"
            }

            // Requisitions
            ErrorCode::RequisitionNotFound => "Requisition not found",
            ErrorCode::RequisitionNotPending => "Only pending requisitions can be modified",
            ErrorCode::RequisitionAmountInvalid => "Requisition amount is invalid",
            ErrorCode::RequisitionAmountExceedsLimit => {
                "Requisition amount exceeds the allowed maximum"
            }
            ErrorCode::RequisitionAlreadyProcessed => {
                "Requisition not found or already processed"
            }
            ErrorCode::RequisitionNotApproved => "Only approved requisitions can be completed",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::TimeoutError => "Request timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::BackupFailed => "Database backup failed",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
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
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1005 => Ok(ErrorCode::AccountDisabled),
            1006 => Ok(ErrorCode::PasswordTooWeak),
            1007 => Ok(ErrorCode::CurrentPasswordIncorrect),
            1008 => Ok(ErrorCode::UsernameExists),
            1009 => Ok(ErrorCode::EmailExists),
            1010 => Ok(ErrorCode::UserNotFound),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::AdminRequired),

            // Inventory
            3001 => Ok(ErrorCode::AssetNotFound),
            3002 => Ok(ErrorCode::AssetCodeExists),
            3101 => Ok(ErrorCode::CategoryNotFound),
            3102 => Ok(ErrorCode::CategoryNameExists),
            3201 => Ok(ErrorCode::ClientNotFound),
            3202 => Ok(ErrorCode::ClientNameExists),

            // Operations
            4001 => Ok(ErrorCode::IncidentNotFound),
            4002 => Ok(ErrorCode::IncidentAlreadyClosed),
            4003 => Ok(ErrorCode::SolutionRequired),
            4101 => Ok(ErrorCode::MaintenanceNotFound),
            4102 => Ok(ErrorCode::MaintenanceInvalidTransition),
            4201 => Ok(ErrorCode::ResponsiveFormNotFound),
            4202 => Ok(ErrorCode::ResponsiveFormAlreadyProcessed),

            // Requisitions
            5001 => Ok(ErrorCode::RequisitionNotFound),
            5002 => Ok(ErrorCode::RequisitionNotPending),
            5003 => Ok(ErrorCode::RequisitionAmountInvalid),
            5004 => Ok(ErrorCode::RequisitionAmountExceedsLimit),
            5005 => Ok(ErrorCode::RequisitionAlreadyProcessed),
            5006 => Ok(ErrorCode::RequisitionNotApproved),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::TimeoutError),
            9004 => Ok(ErrorCode::ConfigError),
            9005 => Ok(ErrorCode::BackupFailed),

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

    const ALL: &[ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::Unknown,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::AlreadyExists,
        ErrorCode::InvalidRequest,
        ErrorCode::TooManyRequests,
        ErrorCode::NotAuthenticated,
        ErrorCode::InvalidCredentials,
        ErrorCode::TokenExpired,
        ErrorCode::TokenInvalid,
        ErrorCode::AccountDisabled,
        ErrorCode::PasswordTooWeak,
        ErrorCode::CurrentPasswordIncorrect,
        ErrorCode::UsernameExists,
        ErrorCode::EmailExists,
        ErrorCode::UserNotFound,
        ErrorCode::PermissionDenied,
        ErrorCode::AdminRequired,
        ErrorCode::AssetNotFound,
        ErrorCode::AssetCodeExists,
        ErrorCode::CategoryNotFound,
        ErrorCode::CategoryNameExists,
        ErrorCode::ClientNotFound,
        ErrorCode::ClientNameExists,
        ErrorCode::IncidentNotFound,
        ErrorCode::IncidentAlreadyClosed,
        ErrorCode::SolutionRequired,
        ErrorCode::MaintenanceNotFound,
        ErrorCode::MaintenanceInvalidTransition,
        ErrorCode::ResponsiveFormNotFound,
        ErrorCode::ResponsiveFormAlreadyProcessed,
        ErrorCode::RequisitionNotFound,
        ErrorCode::RequisitionNotPending,
        ErrorCode::RequisitionAmountInvalid,
        ErrorCode::RequisitionAmountExceedsLimit,
        ErrorCode::RequisitionAlreadyProcessed,
        ErrorCode::RequisitionNotApproved,
        ErrorCode::InternalError,
        ErrorCode::DatabaseError,
        ErrorCode::TimeoutError,
        ErrorCode::ConfigError,
        ErrorCode::BackupFailed,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::AssetNotFound.code(), 3001);
        assert_eq!(ErrorCode::IncidentNotFound.code(), 4001);
        assert_eq!(ErrorCode::RequisitionAmountInvalid.code(), 5003);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
        assert!(!ErrorCode::NotFound.is_success());
    }

    #[test]
    fn test_roundtrip_all_codes() {
        for code in ALL {
            let value: u16 = (*code).into();
            assert_eq!(ErrorCode::try_from(value), Ok(*code), "code {}", value);
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(6001), Err(InvalidErrorCode(6001)));
        assert_eq!(
            InvalidErrorCode(42).to_string(),
            "invalid error code: 42"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::RequisitionNotPending).unwrap();
        assert_eq!(json, "5002");
        let code: ErrorCode = serde_json::from_str("1002").unwrap();
        assert_eq!(code, ErrorCode::InvalidCredentials);
        assert!(serde_json::from_str::<ErrorCode>("7777").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::TokenExpired.to_string(), "1003");
    }
}
