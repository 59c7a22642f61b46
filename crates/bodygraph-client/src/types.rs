//! Wire types returned by the calculation service

use bodygraph_core::{Activation, ActivationSet, Body, Stream, Topology};
use serde::{Deserialize, Serialize};

/// One celestial placement mapped to a gate and line
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub body: String,
    pub gate: i64,
    pub line: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ecliptic_longitude: Option<f64>,
}

impl Position {
    pub fn new(body: impl Into<String>, gate: i64, line: i64) -> Self {
        Self {
            body: body.into(),
            gate,
            line,
            ecliptic_longitude: None,
        }
    }

    /// Validate against the fixed domain. Out-of-range gates or lines and
    /// unknown body names are contract mismatches, never skipped.
    pub fn to_activation(&self, stream: Stream) -> bodygraph_core::Result<Activation> {
        let body: Body = self.body.parse()?;
        Ok(Activation::parse(self.gate, self.line, stream)?.with_body(body))
    }
}

/// Result of one chart calculation: two independent activation streams
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationResponse {
    #[serde(default)]
    pub name: Option<String>,
    pub personality_activations: Vec<Position>,
    pub design_activations: Vec<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_datetime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_at: Option<String>,
}

impl CalculationResponse {
    /// Validated activations of both streams. A stream with a Sun but no
    /// Earth gets its Earth inferred half a turn from the Sun.
    pub fn to_activation_set(&self) -> bodygraph_core::Result<ActivationSet> {
        let personality = self
            .personality_activations
            .iter()
            .map(|p| p.to_activation(Stream::Personality));
        let design = self
            .design_activations
            .iter()
            .map(|p| p.to_activation(Stream::Design));
        let activations = personality
            .chain(design)
            .collect::<bodygraph_core::Result<Vec<_>>>()?;
        Ok(ActivationSet::from_activations(activations)
            .with_inferred_earth(Topology::global(), |stream| self.sun_longitude(stream)))
    }

    fn positions(&self, stream: Stream) -> &[Position] {
        match stream {
            Stream::Personality => &self.personality_activations,
            Stream::Design => &self.design_activations,
        }
    }

    fn sun_longitude(&self, stream: Stream) -> Option<f64> {
        self.positions(stream)
            .iter()
            .find(|p| p.body.parse::<Body>().ok() == Some(Body::Sun))
            .and_then(|p| p.ecliptic_longitude)
    }
}

/// Structured error body from the calculation service
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub retry_after: Option<u64>,
}

/// Error bodies arrive either bare or under a `detail` key, and `detail`
/// may be a plain string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Wrapped { detail: ErrorDetail },
    Bare(ServiceErrorBody),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Structured(ServiceErrorBody),
    Text(String),
}

impl ServiceErrorBody {
    /// Best-effort parse of a non-2xx response body.
    pub fn parse(text: &str) -> Option<Self> {
        match serde_json::from_str::<ErrorEnvelope>(text).ok()? {
            ErrorEnvelope::Bare(body) => Some(body),
            ErrorEnvelope::Wrapped {
                detail: ErrorDetail::Structured(body),
            } => Some(body),
            ErrorEnvelope::Wrapped {
                detail: ErrorDetail::Text(message),
            } => Some(Self {
                code: "ERROR".to_string(),
                message,
                field: None,
                retry_after: None,
            }),
        }
    }
}
