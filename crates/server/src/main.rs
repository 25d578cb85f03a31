use server::config::StudioConfig;
use server::{create_router, state::AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cwd = std::env::current_dir()?;
    let config = StudioConfig::read(&cwd).await.apply_env();
    let port = config.server.port;

    let state = AppState::new(&config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Interview Studio listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
