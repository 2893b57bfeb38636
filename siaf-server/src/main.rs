use siaf_server::{Config, Server, ServerState, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    config.ensure_work_dir_structure()?;

    let log_dir = config.logs_dir();
    init_logger_with_file(
        Some(&config.log_level),
        config.log_json,
        config.is_production().then_some(log_dir.as_path()),
    );

    print_banner();
    tracing::info!(
        work_dir = %config.work_dir,
        environment = %config.environment,
        "Starting SIAF server"
    );

    let state = ServerState::initialize(&config).await?;
    Server::with_state(config, state).run().await?;

    Ok(())
}
