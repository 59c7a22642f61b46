//! Bodygraph gateway - HTTP routes, chart reports, and SVG rendering

pub mod config;
pub mod report;
pub mod server;
pub mod svg;

pub use config::{BindMode, GatewayConfig, ServerConfig, ServiceConfig};
pub use report::{ChartReport, ResolveRequest};
pub use server::{build_router, start_gateway, ApiError, AppState};
pub use svg::render_svg;
