//! # API REST
//!
//! REST API for the letter registry.
//!
//! Handles:
//! - the action endpoint (`POST /exec`) speaking the `success`/`error` envelope
//! - resource-style letter endpoints, the catalog and health checks
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS)
//!
//! Uses `api-shared` for wire types and `registry-core` for the registry itself.

#![warn(rust_2018_idioms)]

pub mod actions;

use api_shared::{
    ActionRequest, AddLetterReq, AddLetterRes, CatalogRes, DetailFieldRes, Envelope, HealthRes,
    HealthService, HistoryEntryRes, LetterTypeRes,
};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use registry_core::{LetterRegistry, RegistryError};
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Application state for the REST API server
///
/// Holds the registry shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<LetterRegistry>,
}

impl AppState {
    pub fn new(registry: Arc<LetterRegistry>) -> Self {
        Self { registry }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health, exec, list_letters, add_letter, catalog),
    components(schemas(
        HealthRes,
        ActionRequest,
        AddLetterReq,
        AddLetterRes,
        HistoryEntryRes,
        CatalogRes,
        LetterTypeRes,
        DetailFieldRes,
    ))
)]
struct ApiDoc;

/// Builds the application router with docs and CORS attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/exec", post(exec))
        .route("/letters", get(list_letters).post(add_letter))
        .route("/catalog", get(catalog))
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn status_for(err: &RegistryError) -> (StatusCode, &'static str) {
    if actions::is_client_error(err) {
        (StatusCode::BAD_REQUEST, "Invalid letter request")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for monitoring and load balancers.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/exec",
    request_body = ActionRequest,
    responses(
        (status = 200, description = "Envelope with status success (data) or error (message)")
    )
)]
/// Action endpoint.
///
/// Always answers `200`; malformed bodies, unknown actions and registry failures are
/// reported inside the envelope.
#[axum::debug_handler]
async fn exec(State(state): State<AppState>, body: Bytes) -> Json<Envelope<Value>> {
    Json(actions::dispatch_json(&state.registry, &body))
}

#[utoipa::path(
    get,
    path = "/letters",
    responses(
        (status = 200, description = "Issuance history, most recent first", body = [HistoryEntryRes]),
        (status = 500, description = "Internal server error")
    )
)]
/// Lists issued letters, most recent first.
///
/// # Returns
/// * `Ok(Json<Vec<HistoryEntryRes>>)` - History entries
/// * `Err((StatusCode, &str))` - Internal server error if the sheet cannot be read
#[axum::debug_handler]
async fn list_letters(
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntryRes>>, (StatusCode, &'static str)> {
    match actions::history(&state.registry) {
        Ok(entries) => Ok(Json(entries)),
        Err(e) => {
            tracing::error!("List letters error: {:?}", e);
            Err(status_for(&e))
        }
    }
}

#[utoipa::path(
    post,
    path = "/letters",
    request_body = AddLetterReq,
    responses(
        (status = 200, description = "Letter registered", body = AddLetterRes),
        (status = 400, description = "Invalid letter type, patient name or date"),
        (status = 500, description = "Internal server error")
    )
)]
/// Registers a letter and returns its generated number.
#[axum::debug_handler]
async fn add_letter(
    State(state): State<AppState>,
    Json(req): Json<AddLetterReq>,
) -> Result<Json<AddLetterRes>, (StatusCode, &'static str)> {
    match actions::register(&state.registry, req) {
        Ok(res) => Ok(Json(res)),
        Err(e) => {
            tracing::error!("Add letter error: {:?}", e);
            Err(status_for(&e))
        }
    }
}

#[utoipa::path(
    get,
    path = "/catalog",
    responses(
        (status = 200, description = "Column layout, letter types and detail fields", body = CatalogRes)
    )
)]
#[axum::debug_handler]
async fn catalog(State(state): State<AppState>) -> Json<CatalogRes> {
    Json(actions::catalog_res(state.registry.catalog()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use registry_core::{ClinicCode, DateLocale, FieldCatalog, MemorySheet, Sheet};
    use serde_json::json;
    use tower::ServiceExt;

    fn app() -> Router {
        let registry = LetterRegistry::new(
            Box::new(MemorySheet::new("letters")) as Box<dyn Sheet>,
            Arc::new(FieldCatalog::standard()),
            ClinicCode::new("KNP").unwrap(),
            DateLocale::Indonesian,
        )
        .unwrap();
        router(AppState::new(Arc::new(registry)))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = app();

        let (status, body) = send(&app, get_request("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
    }

    #[tokio::test]
    async fn test_exec_add_then_get() {
        let app = app();
        let add = json!({
            "action": "add",
            "payload": {
                "letterType": "SKL",
                "patientName": "Siti",
                "letterDate": "2025-03-09",
                "detailData": "{\"baby_name\":\"Rina\",\"birth_time\":\"08:30\"}"
            }
        });

        let (status, added) = send(&app, post_json("/exec", &add.to_string())).await;
        let (_, listed) = send(&app, post_json("/exec", r#"{"action":"get"}"#)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(added["status"], json!("success"));
        assert_eq!(added["data"]["nomorSurat"], json!("001/SKL/KNP/III/2025"));
        assert_eq!(listed["status"], json!("success"));
        assert_eq!(listed["data"][0]["patientName"], json!("Siti"));
        assert_eq!(listed["data"][0]["letterTypeText"], json!("Birth Certificate"));
    }

    #[tokio::test]
    async fn test_exec_errors_stay_in_envelope() {
        let app = app();

        let (unknown_status, unknown) =
            send(&app, post_json("/exec", r#"{"action":"purge"}"#)).await;
        let (garbage_status, garbage) = send(&app, post_json("/exec", "not json")).await;

        assert_eq!(unknown_status, StatusCode::OK);
        assert_eq!(unknown["status"], json!("error"));
        assert!(unknown["message"].as_str().unwrap().contains("purge"));
        assert_eq!(garbage_status, StatusCode::OK);
        assert_eq!(garbage["status"], json!("error"));
    }

    #[tokio::test]
    async fn test_letters_resource() {
        let app = app();
        let first = json!({
            "letterType": "SR",
            "patientName": "Agus",
            "letterDate": "2025-11-02",
            "detailData": {"purpose": "Hospital referral"}
        });
        let second = json!({
            "letterType": "SKT",
            "patientName": "Dewi",
            "letterDate": "2025-11-03",
            "detailData": "{}"
        });

        let (status, res) = send(&app, post_json("/letters", &first.to_string())).await;
        send(&app, post_json("/letters", &second.to_string())).await;
        let (_, history) = send(&app, get_request("/letters")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(res["nomorSurat"], json!("001/SR/KNP/XI/2025"));
        assert_eq!(history[0]["letterNumber"], json!("002/SKT/KNP/XI/2025"));
        assert_eq!(history[1]["detailData"], json!("{\"purpose\":\"Hospital referral\"}"));
    }

    #[tokio::test]
    async fn test_add_letter_rejects_bad_date() {
        let app = app();
        let body = json!({
            "letterType": "SKS",
            "patientName": "Budi",
            "letterDate": "tomorrow",
            "detailData": "{}"
        });

        let (status, _) = send(&app, post_json("/letters", &body.to_string())).await;
        let (_, history) = send(&app, get_request("/letters")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(history, json!([]));
    }

    #[tokio::test]
    async fn test_catalog() {
        let app = app();

        let (status, body) = send(&app, get_request("/catalog")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["columns"][0], json!("ID"));
        assert_eq!(body["columns"].as_array().unwrap().len(), 24);
        assert!(body["detailFields"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["key"] == json!("mother_name")));
    }
}
