use axum::{
    Router,
    http::{HeaderValue, Method, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::config::{ServerSettings, ensure_db_dir};
use crate::storage::SqliteStore;

pub mod error;
pub mod routes;

pub use error::{ApiError, ErrorResponse};

/// Server state
pub struct AppState {
    pub store: Mutex<SqliteStore>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
        })
    }
}

/// CORS policy: `None` allows everything, otherwise one origin with the
/// methods and headers the web front end uses.
pub fn cors_layer(origin: Option<&str>) -> anyhow::Result<CorsLayer> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };

    Ok(CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

pub fn router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(routes::welcome))
        .route("/persons", post(routes::create_person).get(routes::list_persons))
        .route("/persons/{id}", get(routes::get_person))
        .route("/persons/by-company/{company}", get(routes::persons_by_company))
        .route("/persons/{id}/jobs", get(routes::jobs_in_range))
        .route("/jobs", post(routes::create_job))
        .fallback(routes::route_not_found)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!("handler panicked: {}", detail);
    ApiError::Internal.into_response()
}

pub async fn start_server(settings: ServerSettings) -> anyhow::Result<()> {
    ensure_db_dir(&settings.database)?;
    let store = SqliteStore::open(&settings.database)?;
    tracing::info!("Opened database at {}", settings.database.display());

    let cors = cors_layer(settings.cors_origin.as_deref())?;
    let app = router(AppState::new(store), cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
