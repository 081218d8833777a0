use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use school_fees::api::build_router;
use school_fees::config::ServiceConfig;
use school_fees::services::payment_service::PaymentService;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

fn router_with(config: ServiceConfig) -> Router {
    build_router(Arc::new(PaymentService::new(config)))
}

fn router() -> Router {
    router_with(ServiceConfig::instant())
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(Body::from).unwrap_or_else(Body::empty))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn post_payment(router: &Router, body: Value) -> (StatusCode, Value) {
    send(router, Method::POST, "/payments", Some(body.to_string())).await
}

#[tokio::test]
async fn test_healthz() {
    let (status, body) = send(&router(), Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_post_payment_success() {
    let router = router();
    let (status, body) = post_payment(
        &router,
        json!({"studentId": "STU001", "amount": 500, "method": "credit"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Payment processed successfully");
    let payment_id = body["paymentId"].as_str().unwrap();
    assert!(payment_id.starts_with("PAY"));

    let (status, listing) = send(&router, Method::GET, "/payments", None).await;
    assert_eq!(status, StatusCode::OK);
    let groups = listing["payments"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["studentId"], "STU001");
    assert_eq!(groups[0]["payments"][0]["id"], payment_id);
    assert_eq!(groups[0]["payments"][0]["amount"], 500.0);
    assert_eq!(groups[0]["payments"][0]["status"], "completed");
}

#[tokio::test]
async fn test_post_payment_with_card_details() {
    let (status, body) = post_payment(
        &router(),
        json!({
            "studentId": "STU010",
            "amount": "1250.75",
            "method": "credit",
            "cardNumber": "1234 5678 9012 3456",
            "cvv": "123",
            "email": "parent@example.com"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_validation_failure_shape() {
    let (status, body) = post_payment(
        &router(),
        json!({"studentId": "STUDENT001", "amount": 500, "method": "credit"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["statusCode"], 422);
    assert_eq!(body["error"], "Invalid student ID format. Expected format: STU001");
    assert!(body.get("paymentId").is_none());
}

#[tokio::test]
async fn test_missing_amount_is_validation_error() {
    let (status, body) = post_payment(&router(), json!({"studentId": "STU001", "method": "bank"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_bad_card_number_rejected() {
    let (status, body) = post_payment(
        &router(),
        json!({"studentId": "STU001", "amount": 10, "method": "credit", "cardNumber": "1234", "cvv": "123"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Card number must be 16 digits");
}

#[tokio::test]
async fn test_out_of_range_amounts_are_validation_errors() {
    let router = router();
    for (raw, message) in [
        ("1e30", "Payment amount exceeds maximum limit"),
        ("-1e30", "Payment amount must be greater than zero"),
    ] {
        let body = format!(r#"{{"studentId":"STU001","amount":{},"method":"credit"}}"#, raw);
        let (status, body) = send(&router, Method::POST, "/payments", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", raw);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"], message);
    }
}

#[tokio::test]
async fn test_numeric_cvv_is_validation_error() {
    let (status, body) = post_payment(
        &router(),
        json!({"studentId": "STU001", "amount": 10, "method": "credit", "cardNumber": "1234567890123456", "cvv": 123}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "CVV must be 3 or 4 digits");
}

#[tokio::test]
async fn test_duplicate_payment_conflict() {
    let router = router();
    let payload = json!({"studentId": "STU002", "amount": 300, "method": "bank"});

    let (status, _) = post_payment(&router, payload.clone()).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_payment(&router, payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "CONCURRENCY_ERROR");
    assert_eq!(body["statusCode"], 409);
    assert_eq!(body["error"], "Duplicate payment detected");
}

#[tokio::test]
async fn test_malformed_json_is_unknown_error() {
    let (status, body) = send(&router(), Method::POST, "/payments", Some("{not json".to_string())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNKNOWN_ERROR");
    assert_eq!(body["statusCode"], 500);
}

#[tokio::test]
async fn test_gateway_failure_is_structured() {
    let router = router_with(
        ServiceConfig::instant()
            .with_gateway_failure_rate(1.0)
            .with_seed(11),
    );
    let (status, body) = post_payment(
        &router,
        json!({"studentId": "STU001", "amount": 500, "method": "credit"}),
    )
    .await;

    assert_eq!(body["success"], false);
    match body["code"].as_str().unwrap() {
        "PAYMENT_ERROR" => assert_eq!(status, StatusCode::BAD_REQUEST),
        "NETWORK_ERROR" => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body["statusCode"], 503);
        }
        other => panic!("unexpected code {}", other),
    }

    let (_, listing) = send(&router, Method::GET, "/payments", None).await;
    assert!(listing["payments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_end_to_end_with_random_failures_always_structured() {
    let router = router_with(
        ServiceConfig::instant()
            .with_gateway_failure_rate(0.5)
            .with_seed(99),
    );
    let known = [
        "VALIDATION_ERROR",
        "PAYMENT_ERROR",
        "CONCURRENCY_ERROR",
        "NETWORK_ERROR",
    ];

    for i in 1..=20 {
        let (status, body) = post_payment(
            &router,
            json!({"studentId": format!("STU{:03}", i), "amount": 500, "method": "credit"}),
        )
        .await;
        if body["success"] == true {
            assert_eq!(status, StatusCode::OK);
            assert!(!body["paymentId"].as_str().unwrap().is_empty());
        } else {
            assert!(known.contains(&body["code"].as_str().unwrap()), "{}", body);
            assert!(body["message"].is_string());
        }
    }
}

#[tokio::test]
async fn test_report_endpoint() {
    let router = router();
    post_payment(&router, json!({"studentId": "STU001", "amount": 500, "method": "credit"})).await;
    post_payment(&router, json!({"studentId": "STU002", "amount": 200, "method": "bank"})).await;

    let (status, report) = send(
        &router,
        Method::POST,
        "/reports",
        Some(json!({"reportType": "monthly"}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["reportType"], "monthly");
    assert_eq!(report["totalPayments"], 2);
    assert_eq!(report["totalAmount"], 700.0);
    assert_eq!(report["paymentsByMethod"]["credit"], 1);
    assert_eq!(report["paymentsByMethod"]["bank"], 1);
}

#[tokio::test]
async fn test_report_endpoint_rejects_empty_type() {
    let (status, body) = send(
        &router(),
        Method::POST,
        "/reports",
        Some(json!({"reportType": ""}).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"], "Report type is required");
}

#[tokio::test]
async fn test_concurrent_posts_same_student_serialize() {
    let router = router_with(ServiceConfig::instant().with_gateway_delay(Duration::from_millis(10)));

    let mut handles = Vec::new();
    for amount in [100, 200, 300, 400] {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            post_payment(
                &router,
                json!({"studentId": "STU005", "amount": amount, "method": "credit"}),
            )
            .await
        }));
    }
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let (_, listing) = send(&router, Method::GET, "/payments", None).await;
    assert_eq!(listing["payments"][0]["payments"].as_array().unwrap().len(), 4);
}
