//! Shared types for the SIAF back office
//!
//! Error types, response structures, pagination, and the amount-to-words
//! converter used by cash requisitions.

pub mod amount_words;
pub mod error;
pub mod pagination;
pub mod util;

// Re-exports
pub use amount_words::{InvalidAmount, amount_to_words, amount_to_words_f64};
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use pagination::{PageQuery, PaginatedResponse, Pagination};
pub use serde::{Deserialize, Serialize};
