//! HTTP surface: `POST /analizar/` and `GET /health`.
//!
//! The handler authenticates from headers before it touches the body, so a
//! rejected caller never causes any PDF or model work. The multipart extractor
//! is taken as a `Result` for the same reason: a malformed body must not
//! short-circuit ahead of the 403/401 checks.

use crate::analyze::ContractAnalyzer;
use crate::error::{AccessError, AnalysisError};
use crate::license::{authorize, LicenseRegistry};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

/// Header carrying the customer's license key.
pub const LICENSE_HEADER: &str = "x-api-key";

/// Header carrying the caller's upstream model credential.
pub const CREDENTIAL_HEADER: &str = "openai-key";

/// Multipart field holding the PDF.
pub const FILE_FIELD: &str = "file";

/// Default request body limit: 50 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state.
pub struct AppState {
    pub registry: Arc<dyn LicenseRegistry>,
    pub analyzer: ContractAnalyzer,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(registry: Arc<dyn LicenseRegistry>, analyzer: ContractAnalyzer) -> Self {
        Self {
            registry,
            analyzer,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

/// Build the application router with CORS and the upload limit applied.
///
/// CORS is fully open with credentials allowed: the service is embedded in
/// third-party front-ends and relies only on its two headers for access.
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);

    Router::new()
        .route("/health", get(handle_health))
        .route("/analizar/", post(handle_analyze))
        .layer(body_limit)
        .layer(CorsLayer::very_permissive())
        .with_state(Arc::new(state))
}

// ── Responses ────────────────────────────────────────────────────────────

/// Successful analysis body.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    /// Customer the license key belongs to.
    pub usuario: String,
    /// Summary table as returned by the model.
    pub resultado: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Error body: `{"detail": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Everything the endpoint can answer with besides 200.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Access(#[from] AccessError),

    /// The body could not be read as the expected form. `status` is 413 when
    /// the upload limit was hit and 422 otherwise.
    #[error("{detail}")]
    InvalidUpload { status: StatusCode, detail: String },

    #[error("Error en análisis: {0}")]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    /// Upload rejection keeping 413 for an oversize body; every other form
    /// problem is a 422.
    fn invalid_upload(status: StatusCode, detail: impl Into<String>) -> Self {
        let status = if status == StatusCode::PAYLOAD_TOO_LARGE {
            status
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        ApiError::InvalidUpload {
            status,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Access(AccessError::LicenseInvalid) => StatusCode::FORBIDDEN,
            ApiError::Access(AccessError::CredentialMissing) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidUpload { status, .. } => *status,
            ApiError::Analysis(e) => {
                error!("Analysis failed: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            detail: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "contract-analyzer",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Handler: POST /analizar/
pub async fn handle_analyze(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let auth = authorize(
        state.registry.as_ref(),
        header_str(&headers, LICENSE_HEADER),
        header_str(&headers, CREDENTIAL_HEADER),
    )
    .inspect_err(|e| warn!("Request rejected: {:?}", e))?;

    let multipart = multipart.map_err(|e| ApiError::invalid_upload(e.status(), e.body_text()))?;
    let pdf = read_file_field(multipart).await?;
    info!(
        "Analysis requested by '{}': {} bytes",
        auth.customer,
        pdf.len()
    );

    let analysis = state.analyzer.analyze(pdf, &auth.credential).await?;

    Ok(Json(AnalysisResponse {
        usuario: auth.customer,
        resultado: analysis.table,
    }))
}

/// Header value as UTF-8; non-UTF-8 values count as absent.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Pull the bytes of the `file` field out of the form, ignoring other fields.
async fn read_file_field(mut multipart: Multipart) -> Result<Vec<u8>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error("Failed to read form field", e))?
    {
        if field.name() == Some(FILE_FIELD) {
            let data = field
                .bytes()
                .await
                .map_err(|e| form_error("Failed to read file data", e))?;
            return Ok(data.to_vec());
        }
    }

    Err(ApiError::invalid_upload(
        StatusCode::UNPROCESSABLE_ENTITY,
        format!("Falta el archivo en el campo '{}'", FILE_FIELD),
    ))
}

fn form_error(context: &str, e: MultipartError) -> ApiError {
    let status = e.status();
    ApiError::invalid_upload(status, format!("{}: {}", context, e.body_text()))
}
