use axum::{
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::Service;
use uuid::Uuid;

use teamon_api::api::{self, ApiError, ValidatedJson};
use teamon_api::config::Config;
use teamon_api::db::RepositoryError;
use teamon_api::errors::{ApiResponse, ApplicationError, Payload, TokenKind};
use teamon_api::models::{Company, CompanyProfile, CompanyRegistrationRequest, Entity, Team};

fn test_config(debug: bool) -> Config {
    let vars: HashMap<&str, String> = [
        ("ENVIRONMENT", "testing".to_string()),
        ("DEBUG", debug.to_string()),
        ("INSTANCE_ID", "test-instance".to_string()),
    ]
    .into_iter()
    .collect();
    Config::from_source(|key| vars.get(key).cloned()).expect("test config should load")
}

// Helper to create the production app
fn create_test_app() -> Router {
    let state = Arc::new(api::handlers::AppStateInner::new(test_config(false)));
    api::routes::create_router(state)
}

#[derive(Debug, Deserialize)]
struct CreateTeam {
    name: String,
    #[allow(dead_code)]
    company_id: Uuid,
}

async fn create_team(ValidatedJson(body): ValidatedJson<CreateTeam>) -> Result<ApiResponse<Team>, ApiError> {
    let team = Team::new(&body.name, None)?;
    Ok(ApiResponse::success(team))
}

async fn get_company(Path(id): Path<Uuid>) -> Result<ApiResponse<Company>, ApiError> {
    Err(Company::not_found(id).into())
}

async fn approve_registration() -> Result<ApiResponse<()>, ApiError> {
    let profile = CompanyProfile {
        business_registration_number: "123-45-67890".to_string(),
        name: "Teamon".to_string(),
        eng_name: "Teamon".to_string(),
        address: "1 Main St".to_string(),
        phone: "02-000-0000".to_string(),
        ceo_name: "Kim".to_string(),
        homepage_url: None,
    };
    let approver = Uuid::new_v4();
    let mut request = CompanyRegistrationRequest::new(profile, Uuid::new_v4())?;
    request.approve(approver, Uuid::new_v4())?;
    request.approve(approver, Uuid::new_v4())?;
    Ok(ApiResponse::success(None))
}

async fn expired_token() -> Result<ApiResponse<()>, ApiError> {
    Err(ApplicationError::token_expired(TokenKind::Refresh, Payload::new()).into())
}

async fn database_down() -> Result<ApiResponse<()>, ApiError> {
    Err(RepositoryError::Connection("pool timed out".to_string()).into())
}

async fn plain_failure() -> Result<ApiResponse<()>, ApiError> {
    Err(anyhow::anyhow!("boom").into())
}

async fn panics() -> ApiResponse<()> {
    panic!("kaboom")
}

// Helper to create an app with handlers that exercise the error paths
fn create_error_app(debug: bool) -> Router {
    let config = test_config(debug);
    let router = Router::new()
        .route("/teams", post(create_team))
        .route("/companies/:id", get(get_company))
        .route("/registrations/approve", post(approve_registration))
        .route("/me", get(expired_token))
        .route("/db", get(database_down))
        .route("/boom", get(plain_failure))
        .route("/panic", get(panics));
    api::routes::apply_middleware(router, &config)
}

// Helper to create the production app with API routes under the version prefix
fn create_versioned_app() -> Router {
    let state = Arc::new(api::handlers::AppStateInner::new(test_config(false)));
    let v1 = Router::new()
        .route("/teams", post(create_team))
        .route("/companies/:id", get(get_company));
    api::routes::build_router(state, v1)
}

// Helper to send request and parse JSON response
async fn send_json_request(app: &mut Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

// Helper to send JSON request with raw body
async fn send_raw_body_request(
    app: &mut Router,
    method: &str,
    uri: &str,
    body: &str,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, request).await
}

async fn send(app: &mut Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.call(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap_or(json!({}));

    (status, json)
}

#[tokio::test]
async fn test_health_endpoint() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 1000);
    assert_eq!(body["message"], "Success");
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["service"], "teamon-api");
    assert_eq!(body["data"]["environment"], "testing");
    assert_eq!(body["data"]["instance_id"], "test-instance");
    assert!(body.get("error_id").is_none());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let mut app = create_test_app();
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let mut app = create_test_app();
    send_json_request(&mut app, "GET", "/health").await;

    let request = Request::builder()
        .uri("/metrics")
        .body(Body::empty())
        .unwrap();
    let response = app.call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
    assert!(text.contains("path=\"/health\""));
}

#[tokio::test]
async fn test_openapi_document() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api-docs/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["components"]["schemas"]["ErrorBody"].is_object());
}

#[tokio::test]
async fn test_unknown_route_returns_not_found_envelope() {
    let mut app = create_test_app();
    let (status, body) = send_json_request(&mut app, "GET", "/api/v1/nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1001);
    assert_eq!(body["data"]["path"], "/api/v1/nowhere");
}

#[tokio::test]
async fn test_entity_not_found_route() {
    let mut app = create_error_app(false);
    let id = Uuid::new_v4();
    let (status, body) = send_json_request(&mut app, "GET", &format!("/companies/{id}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1001);
    assert_eq!(body["message"], "The requested resource could not be found.");
    assert_eq!(body["data"]["entity_type"], "Company");
    assert_eq!(body["data"]["resource_id"], id.to_string());

    let error_id = body["error_id"].as_str().unwrap();
    assert!(Uuid::parse_str(error_id).is_ok());
}

#[tokio::test]
async fn test_each_failure_gets_a_new_error_id() {
    let mut app = create_error_app(false);
    let uri = format!("/companies/{}", Uuid::nil());
    let (_, first) = send_json_request(&mut app, "GET", &uri).await;
    let (_, second) = send_json_request(&mut app, "GET", &uri).await;

    assert_ne!(first["error_id"], second["error_id"]);
}

#[tokio::test]
async fn test_domain_validation_route() {
    let mut app = create_error_app(false);
    let body = json!({"name": "   ", "company_id": Uuid::new_v4()}).to_string();
    let (status, body) = send_raw_body_request(&mut app, "POST", "/teams", &body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1403);
    assert_eq!(body["data"]["field"], "name");
    assert!(body["error_id"].is_string());
}

#[tokio::test]
async fn test_success_route() {
    let mut app = create_error_app(false);
    let body = json!({"name": "Platform", "company_id": Uuid::new_v4()}).to_string();
    let (status, body) = send_raw_body_request(&mut app, "POST", "/teams", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 1000);
    assert_eq!(body["data"]["name"], "Platform");
    assert_eq!(body["data"]["use_yn"], "Y");
}

#[tokio::test]
async fn test_business_rule_route() {
    let mut app = create_error_app(false);
    let (status, body) = send_json_request(&mut app, "POST", "/registrations/approve").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1607);
    assert_eq!(
        body["message"],
        "Business rule 'RegistrationAlreadyProcessed' was violated."
    );
    assert_eq!(body["data"]["context"]["status"], "APPROVED");
}

#[tokio::test]
async fn test_authentication_route() {
    let mut app = create_error_app(false);
    let (status, body) = send_json_request(&mut app, "GET", "/me").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 2315);
    assert_eq!(body["data"]["token_type"], "refresh");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let mut app = create_error_app(false);
    let (status, body) = send_raw_body_request(&mut app, "POST", "/teams", "{\"name\": ").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], 1403);
    assert_eq!(body["message"], "The input value is invalid.");
    assert_eq!(body["data"]["errors"][0]["field"], "body");
    assert!(body.get("error_id").is_none());
}

#[tokio::test]
async fn test_missing_field_is_located() {
    let mut app = create_error_app(false);
    let (status, body) =
        send_raw_body_request(&mut app, "POST", "/teams", "{\"name\": \"Platform\"}").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["errors"][0]["field"], "body.company_id");
}

#[tokio::test]
async fn test_wrong_type_is_located() {
    let mut app = create_error_app(false);
    let payload = json!({"name": 7, "company_id": Uuid::new_v4()}).to_string();
    let (status, body) = send_raw_body_request(&mut app, "POST", "/teams", &payload).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["errors"][0]["field"], "body.name");
}

#[tokio::test]
async fn test_missing_content_type_is_rejected() {
    let mut app = create_error_app(false);
    let request = Request::builder()
        .method("POST")
        .uri("/teams")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(&mut app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["errors"][0]["field"], "header.content-type");
}

#[tokio::test]
async fn test_database_failure_hides_detail() {
    let mut app = create_error_app(false);
    let (status, body) = send_json_request(&mut app, "GET", "/db").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 9718);
    assert_eq!(body["data"], json!({"error": null}));
    assert!(body.get("error_id").is_none());
}

#[tokio::test]
async fn test_database_failure_detail_in_debug_mode() {
    let mut app = create_error_app(true);
    let (status, body) = send_json_request(&mut app, "GET", "/db").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 9718);
    assert!(body["data"]["error"].as_str().unwrap().contains("pool timed out"));
}

#[tokio::test]
async fn test_unhandled_failure() {
    let mut app = create_error_app(false);
    let (status, body) = send_json_request(&mut app, "GET", "/boom").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 9708);
    assert_eq!(body["data"]["error"], Value::Null);

    let mut app = create_error_app(true);
    let (_, body) = send_json_request(&mut app, "GET", "/boom").await;
    assert_eq!(body["data"]["error"], "boom");
}

#[tokio::test]
async fn test_panic_is_rendered_as_internal_error() {
    let mut app = create_error_app(false);
    let (status, body) = send_json_request(&mut app, "GET", "/panic").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 9708);
    assert_eq!(body["data"]["error"], Value::Null);

    let mut app = create_error_app(true);
    let (_, body) = send_json_request(&mut app, "GET", "/panic").await;
    assert_eq!(body["data"]["error"], "kaboom");
}

#[tokio::test]
async fn test_api_routes_are_mounted_under_prefix() {
    let mut app = create_versioned_app();
    let id = Uuid::new_v4();

    let (status, body) =
        send_json_request(&mut app, "GET", &format!("/api/v1/companies/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["entity_type"], "Company");
    assert!(body["error_id"].is_string());

    let (status, body) = send_json_request(&mut app, "GET", &format!("/companies/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], format!("/companies/{id}"));
    assert!(body.get("error_id").is_none());

    let (status, _) = send_json_request(&mut app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_prefixed_payload_failure() {
    let mut app = create_versioned_app();
    let (status, body) =
        send_raw_body_request(&mut app, "POST", "/api/v1/teams", "{\"name\": \"Platform\"}").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"]["errors"][0]["field"], "body.company_id");
}
