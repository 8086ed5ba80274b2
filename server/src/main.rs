use std::path::PathBuf;

use anyhow::Result;

use railcast_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut config = match std::env::var_os("RAILCAST_CONFIG").map(PathBuf::from) {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    };
    config.apply_env();
    config.validate()?;

    let addr = config.socket_addr()?;
    let state = AppState::initialize(config)?;
    let app = router(state);

    tracing::info!(%addr, "railcast server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
