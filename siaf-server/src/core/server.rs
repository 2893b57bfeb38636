//! HTTP server startup and shutdown

use std::net::SocketAddr;
use std::time::Duration;

use crate::api::build_app;
use crate::audit::AuditAction;
use crate::core::{Config, Result, ServerState};

/// How often stale rate limit entries are dropped
const RATE_LIMIT_CLEANUP_SECS: u64 = 300;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        spawn_rate_limit_cleanup(&state);

        state
            .audit_service
            .log_system(AuditAction::SystemStartup, "Servidor iniciado")
            .await;

        let app = build_app(&state)
            .with_state(state.clone())
            .into_make_service_with_connect_info::<SocketAddr>();

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("SIAF server listening on http://{}", addr);

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        let grace = Duration::from_millis(self.config.shutdown_timeout_ms);
        tokio::spawn(async move {
            shutdown_signal().await;
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        axum_server::bind(addr).handle(handle).serve(app).await?;

        state
            .audit_service
            .log_system(AuditAction::SystemShutdown, "Servidor detenido")
            .await;
        tracing::info!("Server stopped");

        Ok(())
    }
}

fn spawn_rate_limit_cleanup(state: &ServerState) {
    let limiter = state.rate_limiter.clone();
    let max_window = state
        .config
        .login_rate
        .window_secs
        .max(state.config.api_rate.window_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(RATE_LIMIT_CLEANUP_SECS));
        loop {
            interval.tick().await;
            limiter.cleanup(Duration::from_secs(max_window)).await;
        }
    });
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
