//! Suite scenarios exercised against a mocked backend

use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taxicheck::client::ApiClient;
use taxicheck::config::Config;
use taxicheck::context::RunContext;
use taxicheck::suites;

fn test_context(server: &MockServer) -> RunContext {
    let client = ApiClient::new(&server.uri()).expect("client should build");
    RunContext::new(client, Config::default())
}

fn route(route_type: &str, distance_km: f64) -> Value {
    let distance_fare = distance_km * 4.20;
    json!({
        "route_type": route_type,
        "route_description": format!("{} route", route_type),
        "distance_km": distance_km,
        "duration_minutes": 45,
        "duration_in_traffic_minutes": 52,
        "base_fare": 6.60,
        "distance_fare": distance_fare,
        "total_fare": 6.60 + distance_fare,
        "origin_address": "Luzern, Switzerland",
        "destination_address": "Zürich, Switzerland",
        "polyline": "abc123",
        "bounds": {"northeast": {}, "southwest": {}},
        "steps": [],
        "traffic_factor": 1.15
    })
}

#[tokio::test]
async fn health_check_passes_on_expected_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Hello World"})))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::health_check(&mut ctx).await;

    assert!(outcome.is_passed());
    assert_eq!(ctx.report.results.len(), 1);
    assert!(ctx.report.results[0].success);
}

#[tokio::test]
async fn health_check_fails_on_wrong_greeting() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Goodbye"})))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::health_check(&mut ctx).await;

    assert!(!outcome.is_passed());
    assert!(ctx.report.results[0]
        .message
        .contains("Unexpected response content"));
}

#[tokio::test]
async fn login_returns_chainable_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-abc",
            "message": "Erfolgreich angemeldet",
            "expires_at": "2026-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::auth::login_correct_credentials(&mut ctx).await;

    assert_eq!(outcome.value(), Some("tok-abc".to_string()));
}

#[tokio::test]
async fn login_fails_without_german_confirmation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "token": "tok-abc",
            "message": "Logged in",
            "expires_at": "2026-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::auth::login_correct_credentials(&mut ctx).await;

    assert!(!outcome.is_passed());
}

#[tokio::test]
async fn unauthorized_admin_access_must_be_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/payments"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    assert!(suites::auth::unauthorized_access_rejected(&mut ctx)
        .await
        .is_passed());
}

#[tokio::test]
async fn booking_creation_validates_fee_and_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "booking_id": "bk-12345678-abcd",
            "message": "Buchung erstellt",
            "booking_details": {
                "customer_name": "Max Mustermann",
                "vehicle_type": "standard",
                "passenger_count": 2,
                "total_fare": 215.40,
                "booking_fee": 5.0
            }
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::booking::create_standard(&mut ctx).await;

    assert_eq!(outcome.value(), Some("bk-12345678-abcd".to_string()));
    assert!(ctx.report.results[0].success);
}

#[tokio::test]
async fn booking_creation_handles_non_ascii_id() {
    // id whose eighth byte falls inside a multi-byte character; the
    // truncated display form must not abort the scenario
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "booking_id": "1234567ü-rest",
            "message": "Buchung erstellt",
            "booking_details": {
                "customer_name": "Max Mustermann",
                "vehicle_type": "standard",
                "passenger_count": 2,
                "total_fare": 215.40,
                "booking_fee": 5.0
            }
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::booking::create_standard(&mut ctx).await;

    assert_eq!(outcome.value(), Some("1234567ü-rest".to_string()));
    assert!(ctx.report.results[0].success);
    assert!(ctx.report.results[0].message.contains("1234567ü"));
    assert!(!ctx.report.results[0].message.contains("1234567ü-"));
}

#[tokio::test]
async fn booking_creation_rejects_wrong_fee() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bookings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "booking_id": "bk-1",
            "message": "ok",
            "booking_details": {
                "customer_name": "Max Mustermann",
                "vehicle_type": "standard",
                "passenger_count": 2,
                "total_fare": 215.40,
                "booking_fee": 10.0
            }
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::booking::create_standard(&mut ctx).await;

    assert!(!outcome.is_passed());
    assert!(!ctx.report.results[0].success);
}

#[tokio::test]
async fn booking_status_update_uses_query_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/bookings/bk-1/status"))
        .and(query_param("status", "confirmed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    assert!(suites::booking::update_status(&mut ctx, Some("bk-1"))
        .await
        .is_passed());
}

#[tokio::test]
async fn availability_rejects_malformed_slots() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "date": "2025-12-10",
            "available_slots": ["8 o'clock", "9 o'clock"]
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::booking::availability(&mut ctx).await;

    assert!(!outcome.is_passed());
    assert!(ctx.report.results[0].message.contains("Invalid slot format"));
}

#[tokio::test]
async fn payment_initiation_requires_booking_reference() {
    let server = MockServer::start().await;
    // No mocks: a short-circuit must never reach the backend

    let mut ctx = test_context(&server);
    let outcome = suites::payments::initiate(&mut ctx, "Payment Initiation", None, "stripe").await;

    assert!(!outcome.is_passed());
    assert!(ctx.report.results[0]
        .message
        .contains("No booking ID available"));
}

#[tokio::test]
async fn payment_error_table_checks_each_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/payments/initiate"))
        .and(body_json(json!({
            "booking_id": "invalid-booking-id-12345",
            "payment_method": "stripe"
        })))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/initiate"))
        .and(body_json(json!({
            "booking_id": "bk-1",
            "payment_method": "invalid_method"
        })))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/payments/initiate"))
        .and(body_json(json!({"booking_id": "some-id"})))
        .respond_with(ResponseTemplate::new(422))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::payments::error_table(&mut ctx, Some("bk-1")).await;

    assert!(outcome.is_passed());
}

#[tokio::test]
async fn interactive_routes_accepts_correct_metered_pricing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-interactive-routes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [
                route("fastest", 47.2),
                route("shortest", 44.8),
                route("scenic", 55.1),
                route("avoid_highways", 51.0)
            ],
            "comparison": {},
            "total_options": 4,
            "recommended_route": "fastest"
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome =
        suites::routes::interactive_routes(&mut ctx, "Interactive Routes", "Luzern", "Zürich")
            .await;

    assert!(outcome.is_passed());
}

#[tokio::test]
async fn interactive_routes_rejects_broken_pricing() {
    let mut broken = route("fastest", 47.2);
    broken["total_fare"] = json!(999.0);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-interactive-routes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "routes": [
                broken,
                route("shortest", 44.8),
                route("scenic", 55.1),
                route("avoid_highways", 51.0)
            ],
            "comparison": {},
            "total_options": 4,
            "recommended_route": "fastest"
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome =
        suites::routes::interactive_routes(&mut ctx, "Interactive Routes", "Luzern", "Zürich")
            .await;

    assert!(!outcome.is_passed());
    assert!(ctx.report.results[0].message.contains("pricing_ok: false"));
}

#[tokio::test]
async fn weekend_parity_passes_on_identical_fares() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calculate-price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "distance_km": 47.2,
            "estimated_duration_minutes": 45,
            "total_fare": 204.84,
            "route_info": {"route_type": "highway"}
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    assert!(suites::pricing::weekend_parity(&mut ctx).await.is_passed());
}

#[tokio::test]
async fn weekend_parity_fails_on_surcharge() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calculate-price"))
        .and(body_json(json!({
            "origin": "Luzern",
            "destination": "Zürich",
            "departure_time": "2024-09-08T10:00:00"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "distance_km": 47.2,
            "estimated_duration_minutes": 45,
            "total_fare": 225.32,
            "route_info": {"route_type": "highway"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/calculate-price"))
        .and(body_json(json!({
            "origin": "Luzern",
            "destination": "Zürich",
            "departure_time": "2024-09-09T10:00:00"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "distance_km": 47.2,
            "estimated_duration_minutes": 45,
            "total_fare": 204.84,
            "route_info": {"route_type": "highway"}
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::pricing::weekend_parity(&mut ctx).await;

    assert!(!outcome.is_passed());
    assert!(ctx.report.results[0].message.contains("differs by day"));
}

#[tokio::test]
async fn distance_band_bounds_are_inclusive() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calculate-price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "distance_km": 55.0,
            "estimated_duration_minutes": 50,
            "total_fare": 237.60,
            "route_info": {"route_type": "highway"}
        })))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::pricing::distance_band(
        &mut ctx,
        "Swiss Distance - Luzern to Zürich",
        "Luzern",
        "Zürich",
        40.0,
        55.0,
        &["highway", "inter_city"],
    )
    .await;

    assert_eq!(outcome.value(), Some(55.0));
}

#[tokio::test]
async fn capture_rejection_expects_precondition_400() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/payments/tx-1/capture"))
        .respond_with(ResponseTemplate::new(400).set_body_json(
            json!({"detail": "Payment not in authorized state"}),
        ))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    ctx.refs.admin_token = Some("tok".into());

    assert!(suites::capture::capture_not_authorized(&mut ctx, Some("tx-1"))
        .await
        .is_passed());
}

#[tokio::test]
async fn capture_success_breaks_precondition() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/payments/tx-1/capture"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    ctx.refs.admin_token = Some("tok".into());
    let outcome = suites::capture::capture_not_authorized(&mut ctx, Some("tx-1")).await;

    assert!(!outcome.is_passed());
    assert!(ctx.report.results[0].message.contains("never authorized"));
}

#[tokio::test]
async fn password_reset_rejects_fabricated_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/password-reset/verify"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    assert!(suites::password_reset::verify_fabricated_token(&mut ctx)
        .await
        .is_passed());
}

#[tokio::test]
async fn password_reset_rejects_invalid_method() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/password-reset/request"))
        .and(body_json(json!({"method": "invalid_method"})))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Unsupported method"})),
        )
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::password_reset::invalid_method(&mut ctx).await;

    assert!(outcome.is_passed());
    assert!(ctx.report.results[0].success);
}

#[tokio::test]
async fn contact_retrieval_checks_for_submitted_entry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "ct-1", "name": "Test User"},
            {"id": "ct-2", "name": "Other User"}
        ])))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    assert!(suites::contact::retrieval(&mut ctx, Some("ct-1"))
        .await
        .is_passed());
    assert!(!suites::contact::retrieval(&mut ctx, Some("ct-missing"))
        .await
        .is_passed());
}

#[tokio::test]
async fn admin_deletion_without_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/admin/bookings/bk-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    let outcome = suites::admin::delete_unauthorized(&mut ctx, Some("bk-1")).await;

    assert!(outcome.is_passed());
    assert!(ctx.report.results[0].message.contains("401"));
}

#[tokio::test]
async fn admin_deletion_flow_verifies_removal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bookings/bk-1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    assert!(suites::admin::verify_deleted(&mut ctx, Some("bk-1"))
        .await
        .is_passed());
}

#[tokio::test]
async fn stripe_webhook_accepts_rejection_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/webhooks/stripe"))
        .and(wiremock::matchers::headers(
            "Stripe-Signature",
            vec!["t=1234567890", "v1=test_signature"],
        ))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let mut ctx = test_context(&server);
    assert!(suites::payments::stripe_webhook(&mut ctx).await.is_passed());
}
