use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tasador::config::{AppEnvironment, PredictionConfig};
use tasador::workflows::valuation::{
    ErrorInfo, FormField, HttpPredictionClient, PredictionClient, PredictionError,
    PredictionResult, RequestStatus, ValuationForm,
};

#[derive(Clone)]
enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
}

#[derive(Clone)]
struct MockEndpoint {
    reply: Reply,
    received: Arc<Mutex<Vec<Value>>>,
}

impl MockEndpoint {
    fn new(reply: Reply) -> Self {
        Self {
            reply,
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn received(&self) -> Vec<Value> {
        self.received.lock().expect("mock mutex poisoned").clone()
    }
}

async fn predict_handler(
    State(mock): State<MockEndpoint>,
    Json(body): Json<Value>,
) -> Response {
    mock.received
        .lock()
        .expect("mock mutex poisoned")
        .push(body);
    match mock.reply {
        Reply::Json(status, body) => (status, Json(body)).into_response(),
        Reply::Text(status, body) => (status, body).into_response(),
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok", "model_loaded": true }))
}

async fn spawn_endpoint(mock: MockEndpoint) -> String {
    let app = Router::new()
        .route("/prod/predict", post(predict_handler))
        .route("/prod/", get(health_handler))
        .with_state(mock);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock endpoint");
    let addr = listener.local_addr().expect("mock address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock endpoint serves");
    });
    format!("http://{addr}/prod/predict")
}

fn client_for(url: &str) -> Arc<HttpPredictionClient> {
    let config = PredictionConfig::parse(url, AppEnvironment::Test).expect("mock url parses");
    Arc::new(HttpPredictionClient::new(&config))
}

fn capital_federal_form(client: Arc<HttpPredictionClient>) -> ValuationForm<HttpPredictionClient> {
    let form = ValuationForm::new(client);
    for (field, raw) in [
        (FormField::Location, "Capital Federal"),
        (FormField::Bedrooms, "2"),
        (FormField::Bathrooms, "1"),
        (FormField::SurfaceTotal, "80"),
        (FormField::SurfaceCovered, "70"),
    ] {
        form.set_field(field, raw).expect("edit applies");
    }
    form
}

#[tokio::test]
async fn successful_estimate_reaches_succeeded_state() {
    let mock = MockEndpoint::new(Reply::Json(
        StatusCode::OK,
        json!({ "precio_predicho": 150000, "propiedad": "Depto 2 amb" }),
    ));
    let url = spawn_endpoint(mock.clone()).await;
    let form = capital_federal_form(client_for(&url));

    let status = form.submit().await.expect("submission accepted");

    assert_eq!(
        status,
        RequestStatus::Succeeded(PredictionResult {
            estimated_price: 150000.0,
            property_label: Some("Depto 2 amb".to_string()),
            currency: "USD".to_string(),
        })
    );
    assert_eq!(form.current_status(), status);
    assert_eq!(
        mock.received(),
        vec![json!({
            "l2": "Capital Federal",
            "bedrooms": 2,
            "bathrooms": 1,
            "surface_total": 80.0,
            "surface_covered": 70.0,
        })]
    );
}

#[tokio::test]
async fn cordoba_payload_reaches_the_endpoint_verbatim() {
    let mock = MockEndpoint::new(Reply::Json(
        StatusCode::OK,
        json!({ "precio_predicho": 98000.0 }),
    ));
    let url = spawn_endpoint(mock.clone()).await;
    let form = ValuationForm::new(client_for(&url));
    form.set_field(FormField::Location, "Córdoba").expect("edit");
    form.set_field(FormField::Bedrooms, "3").expect("edit");
    form.set_field(FormField::Bathrooms, "2").expect("edit");
    form.set_field(FormField::SurfaceTotal, "90").expect("edit");
    form.set_field(FormField::SurfaceCovered, "85").expect("edit");

    form.submit().await.expect("submission accepted");

    let received = mock.received();
    assert_eq!(received.len(), 1);
    let body = &received[0];
    assert_eq!(body["l2"], "Córdoba");
    assert_eq!(body["bedrooms"], 3);
    assert_eq!(body["bathrooms"], 2);
    assert_eq!(body["surface_total"].as_f64(), Some(90.0));
    assert_eq!(body["surface_covered"].as_f64(), Some(85.0));
    assert_eq!(body.as_object().map(|fields| fields.len()), Some(5));
}

#[tokio::test]
async fn estimated_price_is_copied_exactly() {
    let mock = MockEndpoint::new(Reply::Json(
        StatusCode::OK,
        json!({ "precio_predicho": 123456.78, "moneda": "USD" }),
    ));
    let url = spawn_endpoint(mock).await;
    let form = capital_federal_form(client_for(&url));

    let status = form.submit().await.expect("submission accepted");

    let result = status.result().expect("succeeded");
    assert_eq!(result.estimated_price, 123456.78);
    assert_eq!(result.property_label, None);
}

#[tokio::test]
async fn server_error_becomes_failed_without_price() {
    let mock = MockEndpoint::new(Reply::Json(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "detail": "Modelo no disponible" }),
    ));
    let url = spawn_endpoint(mock.clone()).await;
    let form = capital_federal_form(client_for(&url));

    let status = form.submit().await.expect("submission accepted");

    assert_eq!(status, RequestStatus::Failed(ErrorInfo::generic()));
    assert!(status.result().is_none());
    assert_eq!(mock.received().len(), 1);
}

#[tokio::test]
async fn every_failure_cause_looks_the_same_to_the_form() {
    let missing_price = spawn_endpoint(MockEndpoint::new(Reply::Json(
        StatusCode::OK,
        json!({ "propiedad": "Casa en Santa Fe" }),
    )))
    .await;
    let not_json = spawn_endpoint(MockEndpoint::new(Reply::Text(
        StatusCode::OK,
        "<html>gateway</html>",
    )))
    .await;
    let unreachable = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind throwaway port");
        let addr = listener.local_addr().expect("address");
        drop(listener);
        format!("http://{addr}/prod/predict")
    };

    for url in [missing_price, not_json, unreachable] {
        let form = capital_federal_form(client_for(&url));
        let status = form.submit().await.expect("submission accepted");
        assert_eq!(
            status,
            RequestStatus::Failed(ErrorInfo::generic()),
            "endpoint {url} should collapse to the generic failure"
        );
    }
}

#[tokio::test]
async fn client_reports_specific_causes() {
    let server_error = spawn_endpoint(MockEndpoint::new(Reply::Json(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({}),
    )))
    .await;
    let missing_price = spawn_endpoint(MockEndpoint::new(Reply::Json(
        StatusCode::OK,
        json!({ "moneda": "USD" }),
    )))
    .await;
    let payload = tasador::workflows::valuation::FormInput::default()
        .validate()
        .expect("defaults are valid");

    let err = client_for(&server_error)
        .predict(&payload)
        .await
        .expect_err("503 is a failure");
    assert!(matches!(
        err,
        PredictionError::Status(status) if status.as_u16() == 503
    ));

    let err = client_for(&missing_price)
        .predict(&payload)
        .await
        .expect_err("body without price is a failure");
    assert!(matches!(err, PredictionError::MalformedResponse(_)));
}

#[tokio::test]
async fn invalid_bathrooms_never_leave_the_process() {
    let mock = MockEndpoint::new(Reply::Json(
        StatusCode::OK,
        json!({ "precio_predicho": 1.0 }),
    ));
    let url = spawn_endpoint(mock.clone()).await;
    let form = capital_federal_form(client_for(&url));
    form.set_field(FormField::Bathrooms, "abc").expect("edit applies");

    let status = form.submit().await.expect("submission accepted");

    assert_eq!(status, RequestStatus::Failed(ErrorInfo::generic()));
    assert!(mock.received().is_empty());

    form.set_field(FormField::Bathrooms, "2").expect("edit applies");
    let status = form.submit().await.expect("failed state is re-enterable");
    assert!(matches!(status, RequestStatus::Succeeded(_)));
    assert_eq!(mock.received().len(), 1);
}

#[tokio::test]
async fn health_route_is_read_from_the_service_root() {
    let url = spawn_endpoint(MockEndpoint::new(Reply::Json(StatusCode::OK, json!({})))).await;
    let client = client_for(&url);

    let health = client.health().await.expect("health responds");

    assert_eq!(health.status, "ok");
    assert!(health.model_loaded);
}
