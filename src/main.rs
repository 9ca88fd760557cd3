use poetry_insight::{api::routes::create_router, cache::Cache, config::Config, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "poetry_insight=info".into()),
        )
        .init();

    // Load configuration; missing credentials are reported, not fatal.
    let config = Config::load()?;
    for problem in config.validate() {
        warn!("{}", problem);
    }
    let server_addr = config.server_addr;

    let cache = Cache::connect(&config.redis_url()).await;

    let app_state = AppState {
        config: Arc::new(config),
        cache,
    };

    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
