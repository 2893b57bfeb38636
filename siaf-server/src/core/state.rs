use std::sync::Arc;
use std::time::Instant;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::audit::{AuditService, AuditStorage, AuditWorker};
use crate::auth::{JwtService, RateLimiter};
use crate::core::Config;
use crate::db::{DbService, seed};
use crate::utils::{AppError, AppResult};

/// Server state - shared handles to every service
///
/// Cheap to clone; handlers receive it through `State<ServerState>`.
///
/// | Field | Type | Purpose |
/// |-------|------|---------|
/// | config | Config | immutable configuration |
/// | db | Surreal<Db> | embedded database |
/// | jwt_service | Arc<JwtService> | token issue and validation |
/// | audit_service | Arc<AuditService> | hash-chained audit log |
/// | rate_limiter | RateLimiter | per-IP request counters |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
    pub audit_service: Arc<AuditService>,
    pub rate_limiter: RateLimiter,
    pub started_at: Instant,
}

impl ServerState {
    /// Initialize the server state
    ///
    /// 1. work directory structure
    /// 2. database (`work_dir/database`) and schema
    /// 3. services, audit worker and first-run seeding
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(|e| AppError::internal(e.to_string()))?;

        let db_service = DbService::open(&config.database_dir()).await?;
        Self::with_db(config.clone(), db_service.db).await
    }

    /// Build the state over an already opened database
    ///
    /// Spawns the audit worker, so a Tokio runtime must be running.
    pub async fn with_db(config: Config, db: Surreal<Db>) -> AppResult<Self> {
        let storage = AuditStorage::new(db.clone());
        let (audit_service, rx) = AuditService::new(storage.clone(), config.audit_buffer_size);
        tokio::spawn(AuditWorker::new(storage).run(rx));

        seed::run(&db, &config).await?;

        Ok(Self {
            jwt_service: Arc::new(JwtService::with_config(config.jwt.clone())),
            config,
            db,
            audit_service,
            rate_limiter: RateLimiter::new(),
            started_at: Instant::now(),
        })
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
