//! Authentication and authorization
//!
//! - [`JwtService`] - token issue and validation
//! - [`CurrentUser`] - the authenticated user of a request
//! - [`require_auth`] - global authentication middleware
//! - [`require_permission`] / [`require_admin`] - per-route guards
//! - [`RateLimiter`] - fixed window per-IP limits for login and the API

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod permissions;
pub mod rate_limit;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, require_auth, require_permission};
pub use password::{PasswordPolicyError, hash_password, validate_password, verify_password};
pub use rate_limit::{RateLimitRule, RateLimiter, api_rate_limit, login_rate_limit};
