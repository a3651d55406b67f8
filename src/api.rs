//! REST API server for the EcoLedger traceability service.
//!
//! Exposes the ledger's operations over an action-style traceability
//! endpoint, a read-only verification lookup, and chain inspection, health
//! and stats endpoints for operators.

use axum::{
    extract::{Path, Query, Request, State},
    http::{self, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::block::{Block, RecordInput};
use crate::error::LedgerError;
use crate::ledger::Ledger;

/// Shared service state handed to every handler.
#[derive(Clone)]
pub struct Service {
    pub ledger: Arc<RwLock<Ledger>>,
    api_stats: Arc<RwLock<ApiStats>>,
}

/// API statistics and monitoring
#[derive(Debug, Default)]
struct ApiStats {
    total_requests: u64,
    successful_requests: u64,
    failed_requests: u64,
    records_appended: u64,
    verifications: u64,
    start_time: Option<Instant>,
}

impl ApiStats {
    fn new() -> Self {
        ApiStats {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    fn record_request(&mut self, success: bool) {
        self.total_requests += 1;
        if success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
    }
}

impl Service {
    /// Wrap a ledger for shared use by the API server.
    pub fn new(ledger: Ledger) -> Self {
        Self {
            ledger: Arc::new(RwLock::new(ledger)),
            api_stats: Arc::new(RwLock::new(ApiStats::new())),
        }
    }

    /// Get API statistics
    pub async fn get_stats(&self) -> ApiStatsResponse {
        let chain_height = self.ledger.read().await.len() as u64;
        let stats = self.api_stats.read().await;
        let uptime = stats.start_time.map(|t| t.elapsed().as_secs()).unwrap_or(0);

        ApiStatsResponse {
            total_requests: stats.total_requests,
            successful_requests: stats.successful_requests,
            failed_requests: stats.failed_requests,
            records_appended: stats.records_appended,
            verifications: stats.verifications,
            uptime_seconds: uptime,
            chain_height,
        }
    }
}

// ============================================================================
// API Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    LedgerFailure(LedgerError),
    InvalidInput(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::LedgerFailure(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Ledger operation failed: {}", e),
            ),
            ApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::LedgerFailure(err)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of the action-style traceability endpoint. Only `action` is always
/// required; the remaining fields depend on the chosen action.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceabilityRequest {
    pub action: String,
    #[serde(default)]
    pub subject_key: Option<String>,
    #[serde(default)]
    pub material_origin: Option<String>,
    #[serde(default)]
    pub certification_type: Option<String>,
    #[serde(default)]
    pub certification_number: Option<String>,
    #[serde(default)]
    pub sustainability_score: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupQuery {
    #[serde(default)]
    subject_key: Option<String>,
}

#[derive(Serialize)]
pub struct ApiStatsResponse {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub records_appended: u64,
    pub verifications: u64,
    pub uptime_seconds: u64,
    pub chain_height: u64,
}

// ============================================================================
// Utility Functions
// ============================================================================

fn require_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::InvalidInput(format!("{} is required", name))),
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Request logging and statistics middleware
async fn stats_middleware(State(service): State<Arc<Service>>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    let success = response.status().is_success();
    let mut stats = service.api_stats.write().await;
    stats.record_request(success);

    response
}

/// Detailed request logging middleware. Logs method, path, status and
/// duration for every request.
async fn logging_middleware(
    State(_service): State<Arc<Service>>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let duration = start.elapsed();
    let status = response.status();

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "api.request"
    );

    response
}

// ============================================================================
// API Server
// ============================================================================

/// Build the API router with all endpoints (for testing)
pub fn build_api_router(service: Arc<Service>) -> Router {
    // CORS configuration - allow all origins with credentials
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_methods(vec![
            http::Method::GET,
            http::Method::POST,
            http::Method::OPTIONS,
        ])
        .allow_headers(vec![http::header::CONTENT_TYPE])
        .allow_credentials(true);

    // API routes
    let api_routes = Router::new()
        // Traceability endpoints
        .route(
            "/traceability",
            post(traceability_action).get(traceability_lookup),
        )
        // Chain endpoints
        .route("/chain/block/:index", get(get_block_by_index))
        // System endpoints
        .route("/health", get(health_check))
        .route("/stats", get(get_api_stats))
        // logging before stats so we always record timing
        .layer(middleware::from_fn_with_state(
            service.clone(),
            logging_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            service.clone(),
            stats_middleware,
        ))
        .with_state(service);

    Router::new().nest("/api", api_routes).layer(cors)
}

/// Run the API server on the given address until shutdown.
pub async fn run_api_server(
    service: Arc<Service>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_api_router(service);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

async fn traceability_action(
    State(service): State<Arc<Service>>,
    Json(req): Json<TraceabilityRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match req.action.as_str() {
        "add" => {
            let input = RecordInput {
                subject_key: require_field(req.subject_key, "subjectKey")?,
                material_origin: require_field(req.material_origin, "materialOrigin")?,
                certification_type: require_field(req.certification_type, "certificationType")?,
                certification_number: require_field(
                    req.certification_number,
                    "certificationNumber",
                )?,
                sustainability_score: req.sustainability_score.ok_or_else(|| {
                    ApiError::InvalidInput("sustainabilityScore is required".to_string())
                })?,
            };

            let record = {
                // The write lock serializes appends so every new block links
                // to the true chain tip.
                let mut ledger = service.ledger.write().await;
                ledger.append_record(input)?
            };

            {
                let mut stats = service.api_stats.write().await;
                stats.records_appended += 1;
            }

            Ok(Json(serde_json::json!({
                "success": true,
                "data": {
                    "record": record,
                    "message": "Record added to ledger successfully",
                }
            })))
        }
        "verify" => {
            let subject_key = require_field(req.subject_key, "subjectKey")?;
            let verification = service.ledger.read().await.verify_record(&subject_key);

            {
                let mut stats = service.api_stats.write().await;
                stats.verifications += 1;
            }

            let message = if verification.is_valid {
                "Record verified successfully"
            } else {
                "Record verification failed"
            };

            Ok(Json(serde_json::json!({
                "success": true,
                "data": {
                    "isValid": verification.is_valid,
                    "record": verification.record,
                    "message": message,
                }
            })))
        }
        "get_chain" => {
            let chain = service.ledger.read().await.chain();

            Ok(Json(serde_json::json!({
                "success": true,
                "data": {
                    "chain": chain,
                    "length": chain.len(),
                }
            })))
        }
        _ => Err(ApiError::InvalidInput("Invalid action".to_string())),
    }
}

async fn traceability_lookup(
    State(service): State<Arc<Service>>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let subject_key = params
        .subject_key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidInput("Subject key is required".to_string()))?;

    let verification = service.ledger.read().await.verify_record(&subject_key);

    {
        let mut stats = service.api_stats.write().await;
        stats.verifications += 1;
    }

    Ok(Json(serde_json::json!({
        "success": true,
        "data": {
            "isValid": verification.is_valid,
            "record": verification.record,
            "chainLength": verification.chain.len(),
        }
    })))
}

async fn get_block_by_index(
    State(service): State<Arc<Service>>,
    Path(index): Path<usize>,
) -> Result<Json<Block>, ApiError> {
    service
        .ledger
        .read()
        .await
        .block_at(index)
        .ok_or_else(|| ApiError::NotFound(format!("Block at index {} not found", index)))
        .map(Json)
}

async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339()
        })),
    )
}

async fn get_api_stats(State(service): State<Arc<Service>>) -> impl IntoResponse {
    let stats = service.get_stats().await;
    Json(stats)
}
