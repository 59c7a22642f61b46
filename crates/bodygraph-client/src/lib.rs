//! Bodygraph Client - calculation service collaborator

pub mod request;
pub mod service;
pub mod types;

pub use request::ChartRequest;
pub use service::{ClientError, ClientResult, CalculationService, HttpCalculationService};
pub use types::*;
