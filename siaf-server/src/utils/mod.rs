//! Utilities
//!
//! - [`AppError`] / [`ApiResponse`] - unified error types (from `shared::error`)
//! - logger, date helpers, request validation

pub mod logger;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use validation::validate_payload;
