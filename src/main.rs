use anyhow::Context;
use purchase_tool::config::Config;
use purchase_tool::ports::Ports;
use purchase_tool::router::create_app_router;
use purchase_tool::sandbox::SandboxOrg;
use purchase_tool::tool::AppState;
use purchase_tool::unsplash::UnsplashImages;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    // Wire ports: sandbox records, Unsplash images when a key is configured
    let mut ports = Ports::from_single(Arc::new(SandboxOrg::seeded()));
    if let Some(images) = UnsplashImages::from_config(&config.unsplash)? {
        info!("Using Unsplash for item images");
        ports = ports.with_images(Arc::new(images));
    }

    // Initialize application state
    let addr = config.bind_address();
    let state = Arc::new(AppState::new(ports, config));

    // Build application router with all routes and middleware
    let app = create_app_router(state);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
