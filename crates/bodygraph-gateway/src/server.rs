//! Gateway server: chart routes over the calculation service and the core resolver

use crate::config::GatewayConfig;
use crate::report::{ChartReport, ResolveRequest};
use crate::svg::render_svg;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bodygraph_client::{CalculationService, ChartRequest, ClientError, HttpCalculationService};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub struct AppState {
    pub service: Arc<dyn CalculationService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: Arc<dyn CalculationService>) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }
}

/// Errors surfaced to HTTP callers
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("malformed request body: {0}")]
    Body(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// Activations submitted directly by the caller were out of range.
    #[error(transparent)]
    Activation(#[from] bodygraph_core::Error),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Body(_) => StatusCode::BAD_REQUEST,
            ApiError::Client(ClientError::InvalidRequest { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Client(_) => StatusCode::BAD_GATEWAY,
            ApiError::Activation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn body(&self) -> ErrorBody {
        let (code, field) = match self {
            ApiError::Body(_) => ("INVALID_REQUEST".to_string(), None),
            ApiError::Activation(_) => ("INVALID_ACTIVATION".to_string(), None),
            ApiError::Client(err) => match err {
                ClientError::InvalidRequest { field, .. } => {
                    ("INVALID_REQUEST".to_string(), Some(field.clone()))
                }
                ClientError::Service { code, field, .. } => (
                    code.clone().unwrap_or_else(|| "SERVICE_ERROR".to_string()),
                    field.clone(),
                ),
                ClientError::InvalidResponse(_) => ("INVALID_RESPONSE".to_string(), None),
                ClientError::Chart(_) => ("CONTRACT_MISMATCH".to_string(), None),
                ClientError::Network(_) => ("SERVICE_UNAVAILABLE".to_string(), None),
            },
        };
        ErrorBody {
            code,
            message: self.to_string(),
            field,
        }
    }

    fn retry_after(&self) -> Option<u64> {
        match self {
            ApiError::Client(ClientError::Service { retry_after, .. }) => *retry_after,
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("request failed: {}", self);
        }
        let mut response = (status, Json(self.body())).into_response();
        if let Some(secs) = self.retry_after() {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/chart", post(chart_handler))
        .route("/api/resolve", post(resolve_handler))
        .route("/api/bodygraph.svg", post(svg_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .with_state(state)
}

pub async fn start_gateway(config: GatewayConfig) -> anyhow::Result<()> {
    let mut service = HttpCalculationService::new(&config.service.base_url)
        .with_timeout(config.timeout());
    if let Some(key) = &config.service.api_key {
        service = service.with_api_key(key);
    }
    let state = Arc::new(AppState::new(Arc::new(service)));
    let app = build_router(state);

    let bind_addr: SocketAddr =
        format!("{}:{}", config.server.bind.to_addr(), config.server.port).parse()?;

    info!("Bodygraph Gateway v{} starting", env!("CARGO_PKG_VERSION"));
    info!("  Listening on: {}", bind_addr);
    info!("  Calculation service: {}", config.service.base_url);
    info!("  Service auth: {}", if config.service.api_key.is_some() { "bearer" } else { "none" });

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": state.service.name(),
        "uptime_secs": state.started_at.elapsed().as_secs(),
    }))
}

async fn chart_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ChartRequest>, JsonRejection>,
) -> Result<Json<ChartReport>, ApiError> {
    let Json(request) = body?;
    request.validate()?;

    let response = state.service.calculate(&request).await?;
    let report = ChartReport::from_response(&response).map_err(ClientError::Chart)?;
    info!(
        "chart calculated: source={:?} type={} channels={}",
        report.calculation_source,
        report.summary.chart_type,
        report.channels.len()
    );
    Ok(Json(report))
}

async fn resolve_handler(
    body: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<ChartReport>, ApiError> {
    let Json(request) = body?;
    let activations = request.to_activation_set()?;
    Ok(Json(ChartReport::build(request.name, &activations)))
}

async fn svg_handler(
    body: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body?;
    let activations = request.to_activation_set()?;
    let report = ChartReport::build(request.name, &activations);
    Ok((
        [(header::CONTENT_TYPE, "image/svg+xml")],
        render_svg(&report.layout),
    )
        .into_response())
}
