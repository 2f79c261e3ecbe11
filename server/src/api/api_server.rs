//! HTTP server implementation for the people API

use std::future::Future;
use std::net::SocketAddr;
use axum::{
    extract::DefaultBodyLimit,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::api_handlers;
use people_service_core::{constants::PEOPLE_API_PATH, core::AppState, log_info, log_warn};

/// Creates the application router with all routes and middleware
pub fn create_router(app_state: AppState) -> Router {
    // CORS configuration - permissive, the endpoint carries no credentials
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_origin(Any)
        .allow_credentials(false);

    let body_limit = app_state.config.server.body_limit;

    Router::new()
        // Root route
        .route("/", get(api_handlers::root_handler))

        // People route
        .route(PEOPLE_API_PATH, post(api_handlers::handle_people))

        // System routes
        .route("/health", get(api_handlers::health_check))

        // Apply middleware to ALL routes
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
        )
        .with_state(app_state)
}

/// Bind and serve until the shutdown future completes
async fn serve_api_server_with_app<F>(addr: SocketAddr, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log_info!("Server listening on http://{}", addr);
    log_info!("People endpoint available at http://{}{}", addr, PEOPLE_API_PATH);
    log_info!("Health check available at http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Start the HTTP server with the configured AppState
///
/// The database is connected before the listener opens and disconnected
/// once the server has drained, whether or not serving succeeded.
pub async fn start_api_server<F>(app_state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let http_addr = app_state.config.server.http_addr;
    let db = app_state.db.clone();

    log_info!("Starting people API server on {}", http_addr);
    db.connect().await?;

    let served = serve_api_server_with_app(http_addr, create_router(app_state), shutdown).await;

    db.disconnect().await?;
    log_info!("Database disconnected");
    served
}

/// Resolves on Ctrl+C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log_warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log_warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    log_warn!("Received shutdown signal");
}
