use std::net::SocketAddr;

use chain_service::config::ServiceConfig;
use chain_service::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServiceConfig::from_env()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let service_name = config.service_name.clone();

    let state = AppState::new(config);
    tracing::info!(
        service = %service_name,
        hostname = %state.processor.hostname(),
        "starting chain processor"
    );

    let app = chain_service::build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{} listening on http://{}", service_name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(chain_service::shutdown_signal())
        .await?;

    tracing::info!("{} stopped", service_name);
    Ok(())
}
