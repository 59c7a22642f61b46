//! Calculation service trait and HTTP implementation

use crate::request::ChartRequest;
use crate::types::{CalculationResponse, ServiceErrorBody};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const CALCULATE_PATH: &str = "/api/calculate-chart";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result type for calculation service calls
pub type ClientResult<T> = Result<T, ClientError>;

/// Calculation service error types
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid {field}: {message}")]
    InvalidRequest { field: String, message: String },

    #[error("calculation service returned {status}: {message}")]
    Service {
        status: u16,
        code: Option<String>,
        message: String,
        field: Option<String>,
        retry_after: Option<u64>,
    },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("activation data rejected: {0}")]
    Chart(#[from] bodygraph_core::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// The external service that turns birth data into activation streams.
#[async_trait::async_trait]
pub trait CalculationService: Send + Sync {
    fn name(&self) -> &str;

    /// Callers validate the request first; implementations send it as given.
    async fn calculate(&self, request: &ChartRequest) -> ClientResult<CalculationResponse>;
}

pub struct HttpCalculationService {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpCalculationService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CALCULATE_PATH)
    }
}

impl Default for HttpCalculationService {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
impl CalculationService for HttpCalculationService {
    fn name(&self) -> &str {
        "http"
    }

    async fn calculate(&self, request: &ChartRequest) -> ClientResult<CalculationResponse> {
        let body = request.normalized();
        let url = self.endpoint();

        debug!("calculation request: url={} approximate={}", url, body.birth_time_approximate);

        let mut builder = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("calculation service error {}: {}", status, text);
            return Err(match ServiceErrorBody::parse(&text) {
                Some(body) => ClientError::Service {
                    status: status.as_u16(),
                    code: Some(body.code),
                    message: body.message,
                    field: body.field,
                    retry_after: body.retry_after,
                },
                None => ClientError::Service {
                    status: status.as_u16(),
                    code: None,
                    message: text,
                    field: None,
                    retry_after: None,
                },
            });
        }

        let parsed: CalculationResponse = serde_json::from_str(&text)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;
        debug!(
            "calculation response: personality={} design={} source={:?}",
            parsed.personality_activations.len(),
            parsed.design_activations.len(),
            parsed.calculation_source
        );
        Ok(parsed)
    }
}
