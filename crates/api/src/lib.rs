//! Twin Monitoring API Server
//!
//! REST surface over the detection engine: reading ingest, fault listing
//! and lifecycle actions, rule listing, and health.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use detection::{DetectionEngine, DetectionError};
use fault_rules::RuleStore;
use notifier::AnyNotifier;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use storage::{MemoryRepository, Repository, StorageError};
use tower_governor::GovernorLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub mod rate_limit;
mod routes;
mod settings;

pub use settings::Settings;

/// Engine type as wired by this server
pub type Engine = DetectionEngine<MemoryRepository, AnyNotifier>;

/// Application state shared across handlers
pub struct AppState {
    pub repository: Arc<MemoryRepository>,
    pub rules: Arc<RuleStore>,
    pub engine: Arc<Engine>,
    pub version: String,
    pub start_time: std::time::Instant,
}

/// Error envelope returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level error mapped onto HTTP status codes
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

impl From<DetectionError> for ApiError {
    fn from(err: DetectionError) -> Self {
        match err {
            DetectionError::NotFound(id) => ApiError::NotFound(format!("fault not found: {id}")),
            DetectionError::Persistence(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub metrics: SystemMetrics,
}

/// System metrics
#[derive(Debug, Serialize)]
pub struct SystemMetrics {
    pub reading_count: usize,
    pub fault_count: usize,
    pub rule_count: usize,
}

/// Create the application router.
///
/// With `limits` set, each route group gets its own GCRA tier: the
/// telemetry endpoints take the high-burst ingest tier, the fault
/// lifecycle actions take the strict tier, and the remaining query
/// routes take the configured base tier. The governor keys on the peer
/// IP, so a rate-limited router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(state: Arc<AppState>, limits: Option<&rate_limit::RateLimitConfig>) -> Router {
    let mut telemetry = Router::new().route(
        "/api/v1/readings",
        post(routes::readings::ingest).get(routes::readings::list),
    );
    let mut actions = Router::new()
        .route(
            "/api/v1/faults/:id/acknowledge",
            post(routes::faults::acknowledge),
        )
        .route("/api/v1/faults/:id/resolve", post(routes::faults::resolve));
    let mut queries = Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/faults", get(routes::faults::list))
        .route("/api/v1/rules", get(routes::rules::list));

    if let Some(base) = limits {
        telemetry = telemetry.route_layer(GovernorLayer {
            config: rate_limit::create_governor_config(&rate_limit::RateLimitConfig::ingest()),
        });
        actions = actions.route_layer(GovernorLayer {
            config: rate_limit::create_governor_config(&rate_limit::RateLimitConfig::actions()),
        });
        queries = queries.route_layer(GovernorLayer {
            config: rate_limit::create_governor_config(base),
        });
    }

    queries
        .merge(telemetry)
        .merge(actions)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        metrics: SystemMetrics {
            reading_count: state.repository.reading_count(),
            fault_count: state.repository.fault_count(),
            rule_count: state.rules.len(),
        },
    })
}

/// Initialize logging
pub fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server with the given state
pub async fn run_server(state: Arc<AppState>, settings: &Settings) -> anyhow::Result<()> {
    let app = create_router(state, Some(&settings.rate_limit));

    info!("Starting API server on {}", settings.listen_addr);
    let listener = tokio::net::TcpListener::bind(&settings.listen_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutdown signal received");
    })
    .await?;

    Ok(())
}
