use stockpulse::config::Config;
use stockpulse::{app, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockpulse=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    info!("Starting StockPulse server on {}:{}", config.host, config.port);

    let addr = format!("{}:{}", config.host, config.port);
    let app = app(AppState::new(config));

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("StockPulse server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
