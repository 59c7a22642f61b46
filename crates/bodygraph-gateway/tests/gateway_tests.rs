//! Tests for bodygraph-gateway: routes, error mapping, reports, SVG, config

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use bodygraph_client::{CalculationResponse, CalculationService, ChartRequest, ClientError, ClientResult, Position};
use bodygraph_core::{ActivationSet, CenterCode};
use bodygraph_gateway::*;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

// ===========================================================================
// Fake calculation service
// ===========================================================================

enum Outcome {
    Ok(CalculationResponse),
    Unavailable,
}

struct FakeService {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl FakeService {
    fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl CalculationService for FakeService {
    fn name(&self) -> &str {
        "fake"
    }

    async fn calculate(&self, _request: &ChartRequest) -> ClientResult<CalculationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Ok(response) => Ok(response.clone()),
            Outcome::Unavailable => Err(ClientError::Service {
                status: 503,
                code: Some("EPHEMERIS_UNAVAILABLE".into()),
                message: "ephemeris offline".into(),
                field: None,
                retry_after: Some(5),
            }),
        }
    }
}

fn response(personality: Vec<Position>, design: Vec<Position>) -> CalculationResponse {
    CalculationResponse {
        name: Some("Anna".into()),
        personality_activations: personality,
        design_activations: design,
        design_datetime: None,
        calculation_source: Some("SwissEphemeris".into()),
        calculated_at: None,
    }
}

fn good_response() -> CalculationResponse {
    response(
        vec![
            Position::new("Sun", 41, 4),
            Position::new("Earth", 31, 4),
            Position::new("Mars", 20, 3),
        ],
        vec![
            Position::new("Sun", 7, 1),
            Position::new("Earth", 13, 1),
            Position::new("Moon", 34, 2),
        ],
    )
}

fn chart_body() -> Value {
    json!({
        "firstName": "Anna",
        "birthDate": "23.11.1985",
        "birthTime": "09:15",
        "birthPlace": "Berlin, Deutschland"
    })
}

fn router_with(service: Arc<FakeService>) -> axum::Router {
    build_router(Arc::new(AppState::new(service)))
}

async fn post_json(router: axum::Router, uri: &str, body: String) -> axum::response::Response {
    router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(resp: axum::response::Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
}

fn resolve_body(personality: Value, design: Value) -> String {
    json!({ "name": "Test", "personality": personality, "design": design }).to_string()
}

// ===========================================================================
// Health
// ===========================================================================

#[tokio::test]
async fn health_reports_service() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    let resp = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "fake");
}

// ===========================================================================
// /api/resolve
// ===========================================================================

#[tokio::test]
async fn resolve_throat_sacral_channel() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    let body = resolve_body(json!([{ "gate": 20, "line": 3 }]), json!([{ "gate": 34, "line": 5 }]));
    let resp = post_json(router, "/api/resolve", body).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["firstName"], "Test");
    assert_eq!(json["channels"][0]["code"], "20-34");
    assert_eq!(json["hangingGates"], json!([]));
    assert_eq!(json["gates"]["personality"], json!(["20.3"]));
    assert_eq!(json["gates"]["design"], json!(["34.5"]));
    assert_eq!(json["summary"]["chart_type"], "manifesting_generator");

    let defined: Vec<&str> = json["centers"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|c| c["defined"] == true)
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert_eq!(defined, vec!["throat", "sacral"]);
}

#[tokio::test]
async fn resolve_infers_earth_from_sun() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    let body = resolve_body(
        json!([{ "gate": 41, "line": 2, "body": "Sun" }, { "gate": 7, "line": 1 }]),
        json!([{ "gate": 13, "line": 1, "body": "Sun" }]),
    );
    let resp = post_json(router, "/api/resolve", body).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["channels"][0]["code"], "7-31");
    assert_eq!(json["gates"]["personality"], json!(["7.1", "31.2", "41.2"]));
    assert_eq!(json["gates"]["design"], json!(["7.1", "13.1"]));
    assert_eq!(json["summary"]["chart_type"], "projector");
}

#[tokio::test]
async fn resolve_earth_follows_sun_longitude() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    // Earth at 0.5 degrees falls in 34.5
    let body = resolve_body(
        json!([{ "gate": 20, "line": 3, "body": "Sun", "ecliptic_longitude": 180.5 }]),
        json!([]),
    );
    let json = body_json(post_json(router, "/api/resolve", body).await).await;
    assert_eq!(json["gates"]["personality"], json!(["20.3", "34.5"]));
    assert_eq!(json["channels"][0]["code"], "20-34");
}

#[tokio::test]
async fn resolve_groups_gates_by_center() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    let body = resolve_body(
        json!([{ "gate": 20, "line": 3 }, { "gate": 1, "line": 2 }]),
        json!([{ "gate": 34, "line": 5 }, { "gate": 8, "line": 4 }]),
    );
    let json = body_json(post_json(router, "/api/resolve", body).await).await;
    assert_eq!(
        json["gatesByCenter"],
        json!([
            {
                "center": "throat",
                "personality": [{ "gate": 20, "line": 3 }],
                "design": [{ "gate": 8, "line": 4 }]
            },
            {
                "center": "g",
                "personality": [{ "gate": 1, "line": 2 }],
                "design": []
            },
            {
                "center": "sacral",
                "personality": [],
                "design": [{ "gate": 34, "line": 5 }]
            }
        ])
    );
}

#[tokio::test]
async fn resolve_rejects_out_of_range_gate() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    let body = resolve_body(json!([{ "gate": 65, "line": 1 }]), json!([]));
    let resp = post_json(router, "/api/resolve", body).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body_json(resp).await["code"], "INVALID_ACTIVATION");
}

#[tokio::test]
async fn resolve_rejects_unknown_body() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    let body = resolve_body(json!([{ "gate": 1, "line": 1, "body": "Vulcan" }]), json!([]));
    let resp = post_json(router, "/api/resolve", body).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn resolve_rejects_malformed_json() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    let resp = post_json(router, "/api/resolve", "{not json".into()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["code"], "INVALID_REQUEST");
}

// ===========================================================================
// /api/chart
// ===========================================================================

#[tokio::test]
async fn chart_builds_report_from_service() {
    let service = FakeService::new(Outcome::Ok(good_response()));
    let resp = post_json(router_with(service.clone()), "/api/chart", chart_body().to_string()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(service.calls.load(Ordering::SeqCst), 1);

    let json = body_json(resp).await;
    assert_eq!(json["firstName"], "Anna");
    assert_eq!(json["calculationSource"], "SwissEphemeris");
    assert_eq!(json["summary"]["profile"]["code"], "4/1");
    assert_eq!(json["summary"]["incarnation_cross"]["code"], "41-31-7-13");
    let channels: Vec<&str> = json["channels"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap())
        .collect();
    assert!(channels.contains(&"20-34"));
}

#[tokio::test]
async fn chart_invalid_request_never_reaches_service() {
    let service = FakeService::new(Outcome::Ok(good_response()));
    let mut body = chart_body();
    body["birthDate"] = json!("1985-11-23");
    let resp = post_json(router_with(service.clone()), "/api/chart", body.to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);

    let json = body_json(resp).await;
    assert_eq!(json["code"], "INVALID_REQUEST");
    assert_eq!(json["field"], "birthDate");
}

#[tokio::test]
async fn chart_missing_field_is_bad_request() {
    let service = FakeService::new(Outcome::Ok(good_response()));
    let resp = post_json(router_with(service), "/api/chart", json!({ "firstName": "Anna" }).to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chart_service_failure_is_bad_gateway() {
    let service = FakeService::new(Outcome::Unavailable);
    let resp = post_json(router_with(service), "/api/chart", chart_body().to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        resp.headers().get(header::RETRY_AFTER).and_then(|v| v.to_str().ok()),
        Some("5")
    );
    assert_eq!(body_json(resp).await["code"], "EPHEMERIS_UNAVAILABLE");
}

#[tokio::test]
async fn chart_contract_mismatch_is_bad_gateway() {
    let bad = response(vec![Position::new("Sun", 0, 1)], vec![]);
    let service = FakeService::new(Outcome::Ok(bad));
    let resp = post_json(router_with(service), "/api/chart", chart_body().to_string()).await;
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(resp).await["code"], "CONTRACT_MISMATCH");
}

// ===========================================================================
// /api/bodygraph.svg
// ===========================================================================

#[tokio::test]
async fn svg_draws_defined_and_open_centers() {
    let router = router_with(FakeService::new(Outcome::Unavailable));
    let body = resolve_body(json!([{ "gate": 20, "line": 3 }]), json!([{ "gate": 34, "line": 5 }]));
    let resp = post_json(router, "/api/bodygraph.svg", body).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("image/svg+xml")
    );

    let svg = String::from_utf8(body_bytes(resp).await).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("viewBox=\"0 0 480 580\""));
    assert!(svg.contains("data-channel=\"20-34\""));
    assert_eq!(svg.matches("<polygon").count(), 9);
    assert_eq!(svg.matches("fill=\"#2C3E50\" stroke").count(), 2);
    assert_eq!(svg.matches("fill=\"white\"").count(), 7);
    assert!(svg.contains(">20.3<"));
    assert!(svg.contains(">34.5<"));
}

#[test]
fn svg_empty_chart_has_no_edges() {
    let report = ChartReport::build(None, &ActivationSet::default());
    let svg = render_svg(&report.layout);
    assert!(!svg.contains("<line"));
    assert_eq!(svg.matches("fill=\"white\"").count(), 9);
    // edges precede nodes in document order
    let report = ChartReport::build(None, &ActivationSet::from_streams([(20, 1)], [(34, 1)]).unwrap());
    let svg = render_svg(&report.layout);
    assert!(svg.find("<line").unwrap() < svg.find("<polygon").unwrap());
}

// ===========================================================================
// ChartReport
// ===========================================================================

#[test]
fn report_lists_hanging_gates() {
    let set = ActivationSet::from_streams([(20, 1), (1, 2)], [(34, 1), (60, 4)]).unwrap();
    let report = ChartReport::build(Some("Lena".into()), &set);
    let hanging: Vec<u8> = report.hanging_gates.iter().map(|g| g.number()).collect();
    assert_eq!(hanging, vec![1, 60]);
    assert_eq!(report.channels.len(), 1);
    assert_eq!(report.centers.len(), 9);
    assert_eq!(report.defined_centers().count(), 2);
}

#[test]
fn report_groups_gates_by_center() {
    let set = ActivationSet::from_streams([(20, 1), (1, 2)], [(34, 1), (60, 4)]).unwrap();
    let report = ChartReport::build(None, &set);
    let centers: Vec<_> = report.gates_by_center.iter().map(|g| g.center).collect();
    assert_eq!(
        centers,
        vec![CenterCode::Throat, CenterCode::G, CenterCode::Sacral, CenterCode::Root]
    );
    assert_eq!(report.gates_by_center[3].design[0].to_string(), "60.4");
}

#[test]
fn report_from_response_keeps_source() {
    let report = ChartReport::from_response(&good_response()).unwrap();
    assert_eq!(report.first_name.as_deref(), Some("Anna"));
    assert_eq!(report.calculation_source.as_deref(), Some("SwissEphemeris"));
}

// ===========================================================================
// Config
// ===========================================================================

#[test]
fn config_env_overrides() {
    let config = GatewayConfig::default().with_overrides(|key| match key {
        "BODYGRAPH_SERVICE_URL" => Some("http://calc:9000".into()),
        "BODYGRAPH_API_KEY" => Some("k".into()),
        "BODYGRAPH_PORT" => Some("not-a-port".into()),
        _ => None,
    });
    assert_eq!(config.service.base_url, "http://calc:9000");
    assert_eq!(config.service.api_key.as_deref(), Some("k"));
    assert_eq!(config.server.port, 18800);
}

#[test]
fn config_missing_file_uses_defaults() {
    let config = GatewayConfig::load(std::path::Path::new("/nonexistent/bodygraph.toml"));
    assert_eq!(config, GatewayConfig::default());
}
