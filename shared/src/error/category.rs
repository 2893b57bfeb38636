//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Inventory errors
/// - 4xxx: Operations errors
/// - 5xxx: Requisition errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Permission errors (2xxx)
    Permission,
    /// Inventory errors (3xxx)
    Inventory,
    /// Incidents, maintenance and responsive forms (4xxx)
    Operations,
    /// Requisition errors (5xxx)
    Requisition,
    /// System errors (9xxx, and anything unassigned)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Inventory,
            4000..5000 => Self::Operations,
            5000..6000 => Self::Requisition,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Inventory => "inventory",
            Self::Operations => "operations",
            Self::Requisition => "requisition",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Permission);
        assert_eq!(ErrorCategory::from_code(3101), ErrorCategory::Inventory);
        assert_eq!(ErrorCategory::from_code(4201), ErrorCategory::Operations);
        assert_eq!(ErrorCategory::from_code(5003), ErrorCategory::Requisition);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(7000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::Success.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::AdminRequired.category(),
            ErrorCategory::Permission
        );
        assert_eq!(
            ErrorCode::ClientNameExists.category(),
            ErrorCategory::Inventory
        );
        assert_eq!(
            ErrorCode::MaintenanceInvalidTransition.category(),
            ErrorCategory::Operations
        );
        assert_eq!(
            ErrorCode::RequisitionNotPending.category(),
            ErrorCategory::Requisition
        );
        assert_eq!(ErrorCode::BackupFailed.category(), ErrorCategory::System);
    }

    #[test]
    fn test_category_serde() {
        assert_eq!(
            serde_json::to_string(&ErrorCategory::Requisition).unwrap(),
            "\"requisition\""
        );
        let category: ErrorCategory = serde_json::from_str("\"operations\"").unwrap();
        assert_eq!(category, ErrorCategory::Operations);
        assert_eq!(category.name(), "operations");
    }
}
