pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Events (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Queue
        .route(
            "/api/queue",
            get(routes::queue::get_queue).post(routes::queue::enqueue_job),
        )
        // Human confirmation
        .route("/api/human", get(routes::human::get_pending))
        .route("/api/human/continue", post(routes::human::continue_script))
        // Parameters
        .route("/api/parameters", get(routes::parameters::list_parameters))
        .route(
            "/api/parameters/{key}",
            put(routes::parameters::set_parameter)
                .get(routes::parameters::get_parameter)
                .delete(routes::parameters::delete_parameter),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Serve the control surface on `0.0.0.0:{port}`.
pub async fn serve(app_state: AppState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    serve_on(app_state, listener).await
}

/// Serve on a pre-bound listener, so the caller can read the actual port
/// first (useful when binding port 0).
pub async fn serve_on(app_state: AppState, listener: tokio::net::TcpListener) -> anyhow::Result<()> {
    let port = listener.local_addr()?.port();
    let app = build_router(app_state);

    tracing::info!("autostep control surface listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
