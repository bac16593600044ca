//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequest, Path, Request, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, warn};

use roomap_domain::DomainError;
use roomap_server::handlers::batch::{BatchLookupError, BatchLookupRequest};
use roomap_storage::RoomStore;

use super::state::AppState;
use crate::encoding::{accepts_gzip, encode_json, EncodeError, EncodedBody};
use crate::health::check_store_health;
use crate::middleware::{MetricsLayer, RequestLoggingLayer, RequestIdLayer, RequestMetrics};
use crate::observability::{metrics_handler, MetricsState};

/// JSON extractor that rejects malformed bodies with 400 instead of 422.
///
/// Preserves 413 Payload Too Large for body limit errors.
pub struct JsonBadRequest<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBadRequest<T>
where
    T: serde::de::DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBadRequest(value)),
            Err(rejection) => {
                let message = rejection.body_text();
                if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    Err(ApiError::payload_too_large(message))
                } else {
                    Err(ApiError::validation_error(message))
                }
            }
        }
    }
}

/// Default request body size limit (1MB).
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

fn api_routes<S: RoomStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/room-mappings/batch", post(batch_lookup::<S>))
        .route("/room-mappings/:hotel_id", get(get_room_mappings::<S>))
        .route("/health", get(health_check::<S>))
}

/// Creates the HTTP router with the lookup and health endpoints.
pub fn create_router<S: RoomStore>(state: AppState<S>) -> Router {
    create_router_with_body_limit(state, DEFAULT_BODY_LIMIT)
}

/// Creates the HTTP router with a custom body size limit.
pub fn create_router_with_body_limit<S: RoomStore>(
    state: AppState<S>,
    body_limit: usize,
) -> Router {
    with_middleware(
        api_routes::<S>()
            .with_state(Arc::new(state))
            .layer(RequestBodyLimitLayer::new(body_limit)),
    )
}

/// Creates the HTTP router with the Prometheus `/metrics` endpoint added.
///
/// # Arguments
///
/// * `state` - Application state with storage backend
/// * `metrics_state` - Metrics state for Prometheus endpoint
pub fn create_router_with_observability<S: RoomStore>(
    state: AppState<S>,
    metrics_state: MetricsState,
) -> Router {
    let api_router = api_routes::<S>()
        .with_state(Arc::new(state))
        .layer(RequestBodyLimitLayer::new(DEFAULT_BODY_LIMIT));

    let observability_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_state);

    with_middleware(api_router.merge(observability_router))
}

fn with_middleware(router: Router) -> Router {
    router
        .layer(MetricsLayer::new(Arc::new(RequestMetrics::new())))
        .layer(RequestLoggingLayer::new())
        .layer(RequestIdLayer::new())
}

// ============================================================
// Error Handling
// ============================================================

/// Error codes returned in the `code` field of error bodies.
pub mod error_codes {
    /// Neither key spelling yielded any room record (404).
    pub const ROOM_MAPPINGS_NOT_FOUND: &str = "room_mappings_not_found";
    /// Malformed body, missing field, bad identifier or batch size (400).
    pub const VALIDATION_ERROR: &str = "validation_error";
    /// Request body exceeds the size limit (413).
    pub const PAYLOAD_TOO_LARGE: &str = "payload_too_large";
    /// Unexpected internal error (500).
    pub const INTERNAL_ERROR: &str = "internal_error";
    /// The store could not be reached (503).
    pub const SERVICE_UNAVAILABLE: &str = "service_unavailable";
    /// The store did not answer before the deadline (504).
    pub const TIMEOUT: &str = "timeout";
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a not found error (404).
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(error_codes::ROOM_MAPPINGS_NOT_FOUND, message)
    }

    /// Creates a validation error (400).
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::VALIDATION_ERROR, message)
    }

    /// Creates a payload too large error (413).
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(error_codes::PAYLOAD_TOO_LARGE, message)
    }

    /// Creates an internal error (500).
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(error_codes::INTERNAL_ERROR, message)
    }

    /// Creates a service unavailable error (503).
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(error_codes::SERVICE_UNAVAILABLE, message)
    }

    /// Creates a timeout error (504).
    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::new(error_codes::TIMEOUT, message)
    }

    fn status(&self) -> StatusCode {
        match self.code.as_str() {
            error_codes::ROOM_MAPPINGS_NOT_FOUND => StatusCode::NOT_FOUND,
            error_codes::VALIDATION_ERROR => StatusCode::BAD_REQUEST,
            error_codes::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            error_codes::SERVICE_UNAVAILABLE => StatusCode::SERVICE_UNAVAILABLE,
            error_codes::TIMEOUT => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidIdentifier { .. } => ApiError::validation_error(err.to_string()),
            DomainError::Timeout { duration_ms } => {
                warn!(duration_ms, "Room lookup timed out");
                ApiError::gateway_timeout("room lookup timed out")
            }
            DomainError::StoreUnavailable { message } => {
                // Store details stay in the logs.
                error!(error = %message, "Room lookup failed: store unavailable");
                ApiError::service_unavailable("store is not accessible")
            }
        }
    }
}

impl From<BatchLookupError> for ApiError {
    fn from(err: BatchLookupError) -> Self {
        ApiError::validation_error(err.to_string())
    }
}

impl From<EncodeError> for ApiError {
    fn from(err: EncodeError) -> Self {
        error!(error = %err, "Failed to encode response body");
        ApiError::internal_error("failed to encode response")
    }
}

// ============================================================
// Room Mappings
// ============================================================

/// Request body for `POST /room-mappings/batch`.
#[derive(Debug, Deserialize)]
pub struct BatchLookupBody {
    pub hotel_ids: Vec<String>,
}

async fn get_room_mappings<S: RoomStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(hotel_id): Path<String>,
    headers: HeaderMap,
) -> Result<EncodedBody, ApiError> {
    let records = state.resolver.resolve(&hotel_id).await?;

    if records.is_empty() {
        debug!(hotel_id = %hotel_id, "No room mappings found");
        return Err(ApiError::not_found(format!(
            "no room mappings found for hotel {hotel_id}"
        )));
    }

    Ok(encode_json(&records, accepts_gzip(&headers), &state.gzip)?)
}

async fn batch_lookup<S: RoomStore>(
    State(state): State<Arc<AppState<S>>>,
    headers: HeaderMap,
    JsonBadRequest(body): JsonBadRequest<BatchLookupBody>,
) -> Result<EncodedBody, ApiError> {
    let request = BatchLookupRequest::new(body.hotel_ids);
    let response = state.batch_handler.resolve(request).await?;

    Ok(encode_json(
        &response.hotels,
        accepts_gzip(&headers),
        &state.gzip,
    )?)
}

// ============================================================
// Health
// ============================================================

/// Health check - probes the store under the configured deadline.
///
/// Returns 200 if the store answers, 503 otherwise. Error details are
/// logged but not exposed in the response.
async fn health_check<S: RoomStore>(State(state): State<Arc<AppState<S>>>) -> impl IntoResponse {
    match check_store_health(state.store.as_ref(), state.health_timeout).await {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "healthy" })),
        ),
        Err(e) => {
            error!(error = %e, backend = state.store.backend_name(), "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "status": "unhealthy",
                    "error": "store is not accessible"
                })),
            )
        }
    }
}
