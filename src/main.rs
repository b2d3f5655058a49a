use std::{env, sync::Arc};

use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ead_progress::{config::Config, routes, HttpCurriculumSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "ead_progress=info,axum=info".into())
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env()?;
    let source = HttpCurriculumSource::new(cfg.backend_url.clone(), cfg.backend_timeout)?;
    let state = routes::AppState {
        source: Arc::new(source),
        roster_concurrency: cfg.roster_concurrency,
    };

    let app: Router = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let listener = TcpListener::bind(addr.as_str()).await?;
    tracing::info!(backend = %cfg.backend_url, "listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
