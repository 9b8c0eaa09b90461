use dotenvy::dotenv;
use log::{error, info};

use helpdesk::config::AppConfig;
use helpdesk::main_module::run_axum_server;
use helpdesk::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .write_style(env_logger::WriteStyle::Always)
        .init();

    info!("Starting helpdesk {}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        anyhow::anyhow!("failed to load configuration: {e}")
    })?;
    let state = AppState::from_config(config).await?;

    run_axum_server(state).await?;
    info!("Server stopped");
    Ok(())
}
