use crate::domain::payment::{PaymentRequest, SubmissionOutcome};
use crate::error::{ExceptionHandler, HandledError, Thrown};
use crate::services::payment_service::{PaymentService, StudentPayments};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub fn build_router(service: Arc<PaymentService>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/payments", post(create_payment).get(list_payments))
        .route("/reports", post(create_report))
        .with_state(service)
}

#[derive(Serialize)]
struct PaymentsBody {
    payments: Vec<StudentPayments>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest {
    #[serde(default)]
    report_type: String,
}

// The wire only distinguishes client (400) from server (500) failures; the
// taxonomy status travels in the body as `statusCode`.
fn status_of(code: u16) -> StatusCode {
    match code {
        200..=299 => StatusCode::OK,
        400..=499 => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn failure(handled: HandledError) -> Response {
    let status = status_of(handled.status_code);
    let body = json!({
        "success": false,
        "error": handled.message,
        "code": handled.code,
        "message": handled.message,
        "statusCode": handled.status_code,
    });
    (status, Json(body)).into_response()
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn create_payment(State(service): State<Arc<PaymentService>>, body: Bytes) -> Response {
    let request: PaymentRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return failure(ExceptionHandler::log(&Thrown::from(e))),
    };

    let outcome: SubmissionOutcome = service.submit(request).await;
    (status_of(outcome.status_code), Json(outcome)).into_response()
}

async fn list_payments(State(service): State<Arc<PaymentService>>) -> Json<PaymentsBody> {
    Json(PaymentsBody {
        payments: service.payments_by_student().await,
    })
}

async fn create_report(State(service): State<Arc<PaymentService>>, body: Bytes) -> Response {
    let request: ReportRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => return failure(ExceptionHandler::log(&Thrown::from(e))),
    };

    match service.generate_report(&request.report_type).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => failure(ExceptionHandler::handle(&Thrown::Fee(err))),
    }
}
