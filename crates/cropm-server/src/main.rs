//! Binary entrypoint for the Crop2ML studio server.
//!
//! Configuration comes from `CROPM_*` environment variables; see
//! [`cropm_server::config::ServerConfig`].

use cropm_server::config::ServerConfig;
use cropm_server::router::build_router;
use cropm_server::state::AppState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();
    if config.token.is_none() {
        tracing::warn!("CROPM_TOKEN is not set; the API accepts unauthenticated requests");
    }

    let state = AppState::new(&config);
    let app = build_router(state);

    tracing::info!(
        "cropm server starting on {} (packages in {})",
        config.bind,
        config.packages_root.display()
    );

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    axum::serve(listener, app).await
}
