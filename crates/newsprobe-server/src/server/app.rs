use crate::server::{routes, static_files};
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum application
pub fn build_app(state: AppState) -> Router {
    let body_limit = RequestBodyLimitLayer::new(state.config.max_body_bytes);

    Router::new()
        .route("/", get(routes::health))
        .route("/demo", get(routes::demo))
        .route("/predict-form", post(routes::predict_form))
        .route("/predict", post(routes::predict))
        .route("/metrics", get(routes::render_metrics))
        .route("/assets/*path", get(static_files::serve_static))
        .fallback(routes::not_found)
        // `max_body_bytes` is the only limit; axum's 2 MiB default would cap it
        .layer(DefaultBodyLimit::disable())
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn run_server(
    state: AppState,
    addr: SocketAddr,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("NewsProbe listening on {}", listener.local_addr()?);
    tracing::info!("Demo page at http://{}/demo", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}
