use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use moddeck_api::upstream::BotApi;
use moddeck_api::{AppState, AppStateInner, sessions, sessions::SessionStore};
use moddeck_store::AccountStore;

const DEFAULT_BOT_API_SECRET: &str = "default-secret";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moddeck=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("MODDECK_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("MODDECK_PORT")
        .unwrap_or_else(|_| "5000".into())
        .parse()?;
    let users_file =
        std::env::var("MODDECK_USERS_FILE").unwrap_or_else(|_| "data/users.json".into());
    let static_dir = std::env::var("MODDECK_STATIC_DIR").unwrap_or_else(|_| "public".into());
    let production = std::env::var("MODDECK_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);
    let bot_api_url =
        std::env::var("BOT_API_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let bot_api_secret = std::env::var("API_SECRET")
        .or_else(|_| std::env::var("BOT_API_SECRET"))
        .unwrap_or_else(|_| DEFAULT_BOT_API_SECRET.into());
    if bot_api_secret == DEFAULT_BOT_API_SECRET {
        warn!("API_SECRET/BOT_API_SECRET not set, bot API calls use the placeholder secret");
    }

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        store: AccountStore::new(&users_file),
        sessions: SessionStore::new(),
        bot: BotApi::new(bot_api_url, bot_api_secret),
        production,
        started_at: Instant::now(),
    });

    // Background session pruning (runs every 24h, matching the session TTL)
    tokio::spawn(sessions::run_prune_loop(state.clone(), 86_400));

    // API routes plus the dashboard SPA as a static fallback
    let app = moddeck_api::router(state)
        .fallback_service(ServeDir::new(&static_dir))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Moddeck dashboard server listening on {}", addr);
    info!("Account file: {}", users_file);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
