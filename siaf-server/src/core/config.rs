use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::auth::{JwtConfig, JwtError, RateLimitRule};

/// Default business ceiling for a single requisition
pub const DEFAULT_REQUISITION_MAX_AMOUNT: &str = "999999999.99";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT configuration: {0}")]
    Jwt(#[from] JwtError),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("Failed to prepare work directory: {0}")]
    Io(#[from] std::io::Error),
}

/// First-run administrator account
#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub username: String,
    /// Generated and logged once when unset
    pub password: Option<String>,
    pub email: Option<String>,
}

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./siaf-data | database, logs and backups root |
/// | HTTP_PORT | 5000 | HTTP port |
/// | ENVIRONMENT | development | `production` enables file logs and a mandatory JWT secret |
/// | LOG_LEVEL | info | default tracing level |
/// | LOG_JSON | false | JSON log lines |
/// | JWT_SECRET | generated in development | signing secret |
/// | JWT_EXPIRATION_MINUTES | 1440 | token lifetime |
/// | LOGIN_RATE_LIMIT / LOGIN_RATE_WINDOW_SECS | 5 / 900 | login attempts per IP |
/// | API_RATE_LIMIT / API_RATE_WINDOW_SECS | 100 / 60 | API requests per IP |
/// | TRUSTED_PROXY | none | peer whose `X-Forwarded-For` is honoured |
/// | REQUISITION_MAX_AMOUNT | 999999999.99 | requisition ceiling |
/// | REQUISITION_DEPARTMENT | SISTEMAS | department on new requisitions |
/// | COMPANY_NAME | BEACHSCAPE KIN HA VILLAS & SUITES | printed on form data |
/// | ADMIN_USERNAME / ADMIN_PASSWORD / ADMIN_EMAIL | admin / generated / none | first-run admin |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | graceful shutdown window |
///
/// ```ignore
/// WORK_DIR=/srv/siaf HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    /// development | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub jwt: JwtConfig,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub login_rate: RateLimitRule,
    pub api_rate: RateLimitRule,
    /// Reverse proxy allowed to report the client address
    pub trusted_proxy: Option<IpAddr>,
    pub requisition_max_amount: Decimal,
    pub requisition_department: String,
    pub company_name: String,
    pub admin: AdminBootstrap,
    /// Capacity of the audit log channel
    pub audit_buffer_size: usize,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_string(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl Config {
    /// Load from environment variables, defaults for anything unset
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = env_string("ENVIRONMENT", "development");
        let production = environment == "production";

        let max_amount_raw = env_string("REQUISITION_MAX_AMOUNT", DEFAULT_REQUISITION_MAX_AMOUNT);
        let requisition_max_amount = Decimal::from_str(&max_amount_raw)
            .ok()
            .filter(|d| d.is_sign_positive() && !d.is_zero())
            .ok_or(ConfigError::InvalidValue {
                name: "REQUISITION_MAX_AMOUNT",
                value: max_amount_raw,
            })?;

        let trusted_proxy = match std::env::var("TRUSTED_PROXY") {
            Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue {
                    name: "TRUSTED_PROXY",
                    value: raw.clone(),
                }
            })?),
            _ => None,
        };

        Ok(Self {
            work_dir: env_string("WORK_DIR", "./siaf-data"),
            http_port: env_or("HTTP_PORT", 5000),
            jwt: JwtConfig::from_env(production)?,
            environment,
            log_level: env_string("LOG_LEVEL", "info"),
            log_json: env_or("LOG_JSON", false),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30_000),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", 10_000),
            login_rate: RateLimitRule::new(
                env_or("LOGIN_RATE_LIMIT", 5),
                env_or("LOGIN_RATE_WINDOW_SECS", 900),
            ),
            api_rate: RateLimitRule::new(
                env_or("API_RATE_LIMIT", 100),
                env_or("API_RATE_WINDOW_SECS", 60),
            ),
            trusted_proxy,
            requisition_max_amount,
            requisition_department: env_string("REQUISITION_DEPARTMENT", "SISTEMAS"),
            company_name: env_string("COMPANY_NAME", "BEACHSCAPE KIN HA VILLAS & SUITES"),
            admin: AdminBootstrap {
                username: env_string("ADMIN_USERNAME", "admin"),
                password: std::env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
                email: std::env::var("ADMIN_EMAIL").ok().filter(|e| !e.is_empty()),
            },
            audit_buffer_size: env_or("AUDIT_BUFFER_SIZE", 1024),
        })
    }

    /// Deterministic configuration rooted at `work_dir`, independent of the environment
    ///
    /// Used by tests.
    pub fn for_testing(work_dir: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            work_dir: work_dir.into(),
            http_port: 0,
            environment: "test".to_string(),
            log_level: "debug".to_string(),
            log_json: false,
            jwt: JwtConfig::with_random_secret()?,
            request_timeout_ms: 30_000,
            shutdown_timeout_ms: 1_000,
            login_rate: RateLimitRule::new(5, 900),
            api_rate: RateLimitRule::new(1_000, 60),
            trusted_proxy: None,
            requisition_max_amount: Decimal::new(99_999_999_999, 2),
            requisition_department: "SISTEMAS".to_string(),
            company_name: "BEACHSCAPE KIN HA VILLAS & SUITES".to_string(),
            admin: AdminBootstrap {
                username: "admin".to_string(),
                password: Some("Admin2025x".to_string()),
                email: Some("sistemas@kinha.test".to_string()),
            },
            audit_buffer_size: 64,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    pub fn logs_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("logs")
    }

    pub fn backups_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("backups")
    }

    /// Create `database/`, `logs/` and `backups/` under the work directory
    pub fn ensure_work_dir_structure(&self) -> Result<(), ConfigError> {
        for dir in [self.database_dir(), self.logs_dir(), self.backups_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testing_config_layout() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::for_testing(dir.path().to_string_lossy()).unwrap();
        config.ensure_work_dir_structure().unwrap();

        assert!(config.database_dir().is_dir());
        assert!(config.logs_dir().is_dir());
        assert!(config.backups_dir().is_dir());
        assert!(!config.is_production());
        assert_eq!(config.requisition_max_amount.to_string(), "999999999.99");
    }

    #[test]
    fn test_default_ceiling_parses() {
        let d = Decimal::from_str(DEFAULT_REQUISITION_MAX_AMOUNT).unwrap();
        assert_eq!(d, Decimal::new(99_999_999_999, 2));
    }
}
