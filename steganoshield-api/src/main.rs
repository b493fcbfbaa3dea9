use std::net::SocketAddr;

use steganoshield_api::{AppState, BackendKind, ServerConfig, router};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "steganoshield_api=debug,analyzers=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    if config.backend == BackendKind::Gemini && config.gemini.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; classification requests will fail until it is");
    }

    let state = AppState::new(config.build_backend());
    let app = router(state, config.max_body_bytes);

    tracing::info!("🛡️ SteganoShield API Server ({:?} backend)", config.backend);
    tracing::info!("📖 Endpoint: POST /api/classify - Send an image data URI and get a classification");

    let listener = bind(config.port).await?;
    tracing::info!("✅ Server ready on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

async fn bind(port: u16) -> std::io::Result<TcpListener> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) if e.kind() == std::io::ErrorKind::AddrInUse => {
            let fallback = port.saturating_add(1);
            tracing::warn!("Port {} in use, trying port {}...", port, fallback);
            TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], fallback))).await
        }
        Err(e) => Err(e),
    }
}
