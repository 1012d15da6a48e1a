mod broadcast;
mod config;
mod error;
mod hub;
mod protocol;
mod rooms;
mod session;
mod state;
mod vote;
mod utils {
    pub mod clean;
    pub mod ids;
}
mod routes;

use axum::{Extension, Router};
use tower_http::{limit::RequestBodyLimitLayer, services::ServeDir};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::AppResult, utils::clean};

/// No route takes a request body.
const BODY_LIMIT: usize = 16 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cfg = Config::from_env()?;
    serve(cfg).await?;
    Ok(())
}

async fn serve(cfg: Config) -> AppResult<()> {
    let hub = state::shared(cfg.limits);

    tokio::spawn(clean::task(hub.clone(), cfg.sweep_every));  // 啟動清道夫

    let app = Router::new()
        .merge(routes::router())
        .fallback_service(ServeDir::new(&cfg.static_dir))
        .layer(Extension(hub))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT));

    let listener = tokio::net::TcpListener::bind(cfg.addr()).await?;
    info!(addr = %cfg.addr(), static_dir = %cfg.static_dir, "whiteboard server listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
