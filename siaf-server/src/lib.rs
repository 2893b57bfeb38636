//! SIAF Server - hotel back office for Beachscape Kin Ha
//!
//! # Module layout
//!
//! ```text
//! siaf-server/src/
//! ├── core/          # config, state, server
//! ├── auth/          # JWT, argon2 passwords, permissions, rate limiting
//! ├── db/            # embedded SurrealDB, models, repositories, seeding
//! ├── audit/         # hash-chained audit log
//! ├── services/      # database backup
//! ├── api/           # HTTP routes and handlers
//! └── utils/         # logger, time helpers, validation
//! ```
//!
//! Cash requisitions store the amount written in Spanish words, produced by
//! [`shared::amount_to_words`].

pub mod api;
pub mod audit;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod utils;

// Re-export public types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
   _____ _____          ______
  / ____|_   _|   /\   |  ____|
 | (___   | |    /  \  | |__
  \___ \  | |   / /\ \ |  __|
  ____) |_| |_ / ____ \| |
 |_____/|_____/_/    \_\_|
        "#
    );
    println!("  Beachscape Kin Ha - back office");
    println!("  v{}", env!("CARGO_PKG_VERSION"));
    println!();
}
