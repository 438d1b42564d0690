//! Distance and fare calculation suite
//!
//! Black-box numeric-range checks against `/calculate-price`: each named
//! route must land inside an inclusive distance band with an expected route
//! classification, and pricing must be identical across weekdays.

use serde_json::json;

use super::{health_check, status_mismatch, transport_error};
use crate::context::RunContext;
use crate::outcome::Outcome;

pub async fn run(ctx: &mut RunContext) {
    if !health_check(ctx).await.is_passed() {
        return;
    }

    distance_band(
        ctx,
        "Swiss Distance - Luzern to Zürich",
        "Luzern",
        "Zürich",
        40.0,
        55.0,
        &["highway", "inter_city"],
    )
    .await;
    distance_band(
        ctx,
        "Swiss Distance - Luzern to Schwyz",
        "Luzern",
        "Schwyz",
        25.0,
        40.0,
        &["inter_city", "suburban"],
    )
    .await;
    distance_band(
        ctx,
        "Swiss Distance - Zug to Zürich Flughafen",
        "Zug",
        "Zürich Flughafen",
        20.0,
        40.0,
        &["highway", "inter_city"],
    )
    .await;

    unknown_location(ctx).await;
    price_with_departure_time(ctx).await;
    weekend_parity(ctx).await;
    validation(ctx).await;
}

/// One named route: distance inside the inclusive band, route type from the
/// allowed set, all required response fields present.
pub async fn distance_band(
    ctx: &mut RunContext,
    name: &str,
    origin: &str,
    destination: &str,
    min_km: f64,
    max_km: f64,
    route_types: &[&str],
) -> Outcome<f64> {
    let payload = json!({"origin": origin, "destination": destination});

    let response = match ctx.client.post_json("/calculate-price", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, name, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, name, 200, &response);
    }

    let missing: Vec<&str> = [
        "distance_km",
        "estimated_duration_minutes",
        "total_fare",
        "route_info",
    ]
    .into_iter()
    .filter(|field| response.body.get(field).is_none())
    .collect();
    if !missing.is_empty() {
        let detail = format!("Missing required fields: {:?}", missing);
        ctx.report.record_fail(name, &detail);
        return Outcome::Failed(detail);
    }

    let distance = response.num_field("distance_km").unwrap_or(f64::NAN);
    let route_type = response
        .body
        .pointer("/route_info/route_type")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("unknown");

    // Inclusive bounds on both ends
    let distance_ok = distance >= min_km && distance <= max_km;
    let route_ok = route_types.contains(&route_type);

    if distance_ok && route_ok {
        ctx.report.record(
            name,
            true,
            &format!(
                "Distance: {}km, Route: {}, Fare: CHF {}",
                distance, route_type, response.body["total_fare"]
            ),
            Some(json!({
                "distance_km": distance,
                "route_type": route_type,
                "duration_minutes": response.body["estimated_duration_minutes"],
                "total_fare": response.body["total_fare"],
            })),
        );
        Outcome::Passed(distance)
    } else {
        let detail = format!(
            "Unexpected values - Distance: {}km (expected {}-{}), Route: {} (expected {:?})",
            distance, min_km, max_km, route_type, route_types
        );
        ctx.report.record_fail(name, &detail);
        Outcome::Failed(detail)
    }
}

/// A location outside the coverage map must be rejected gracefully, never a 5xx
pub async fn unknown_location(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Swiss Distance - Unknown Location";

    let payload = json!({"origin": "Luzern", "destination": "Atlantis"});

    let response = match ctx.client.post_json("/calculate-price", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status < 500 {
        ctx.report.record_pass(
            NAME,
            &format!("Unknown location handled gracefully (status {})", response.status),
        );
        Outcome::Passed(())
    } else {
        let detail = format!("Server error {} for unknown location", response.status);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// Pricing with an explicit departure time must still produce a positive fare
pub async fn price_with_departure_time(ctx: &mut RunContext) -> Outcome<f64> {
    const NAME: &str = "Price Calculation - With Departure Time";

    let payload = json!({
        "origin": "Luzern",
        "destination": "Zürich",
        "departure_time": "2025-12-10T14:30:00"
    });

    let response = match ctx.client.post_json("/calculate-price", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    match response.num_field("total_fare") {
        Some(fare) if fare > 0.0 => {
            ctx.report
                .record_pass(NAME, &format!("Fare with departure time: CHF {}", fare));
            Outcome::Passed(fare)
        }
        other => {
            let detail = format!("Missing or non-positive total_fare: {:?}", other);
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
    }
}

/// Sunday and Monday fares for the same route must agree to within 0.01:
/// weekend surcharges are gone and pricing is uniform across days.
pub async fn weekend_parity(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Weekend Surcharge Removal Verification";

    let sunday = json!({
        "origin": "Luzern",
        "destination": "Zürich",
        "departure_time": "2024-09-08T10:00:00"
    });
    let monday = json!({
        "origin": "Luzern",
        "destination": "Zürich",
        "departure_time": "2024-09-09T10:00:00"
    });

    let sunday_response = match ctx.client.post_json("/calculate-price", &sunday, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };
    if sunday_response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &sunday_response);
    }

    let monday_response = match ctx.client.post_json("/calculate-price", &monday, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };
    if monday_response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &monday_response);
    }

    let sunday_fare = sunday_response.num_field("total_fare").unwrap_or(f64::NAN);
    let monday_fare = monday_response.num_field("total_fare").unwrap_or(f64::NAN);
    let sunday_distance = sunday_response.num_field("distance_km").unwrap_or(f64::NAN);
    let monday_distance = monday_response.num_field("distance_km").unwrap_or(f64::NAN);

    let fares_identical = (sunday_fare - monday_fare).abs() < 0.01;
    let distances_identical = (sunday_distance - monday_distance).abs() < 0.01;

    if fares_identical && distances_identical {
        ctx.report.record(
            NAME,
            true,
            &format!(
                "Uniform pricing confirmed: Sunday CHF {} = Monday CHF {}",
                sunday_fare, monday_fare
            ),
            Some(json!({
                "sunday_total_fare": sunday_fare,
                "monday_total_fare": monday_fare,
                "price_difference": (sunday_fare - monday_fare).abs(),
            })),
        );
        Outcome::Passed(())
    } else {
        let detail = format!(
            "Pricing differs by day: Sunday CHF {} vs Monday CHF {} ({}km vs {}km)",
            sunday_fare, monday_fare, sunday_distance, monday_distance
        );
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// Missing origin or destination must be a 422
pub async fn validation(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Price Calculation Validation";

    let cases = [
        ("Missing Origin", json!({"destination": "Zürich"})),
        ("Missing Destination", json!({"origin": "Luzern"})),
        ("Empty Payload", json!({})),
    ];

    let mut case_results = Vec::new();
    for (case_name, payload) in &cases {
        let line = match ctx.client.post_json("/calculate-price", payload, None).await {
            Ok(response) if response.status == 422 => format!("ok: {}", case_name),
            Ok(response) => format!(
                "mismatch: {} (got {}, expected 422)",
                case_name, response.status
            ),
            Err(err) => format!("error: {} ({})", case_name, err),
        };
        case_results.push(line);
    }

    let passed = case_results.iter().filter(|r| r.starts_with("ok")).count();
    let all_passed = passed == cases.len();
    ctx.report.record(
        NAME,
        all_passed,
        &format!("Validation tests: {}/{} passed", passed, cases.len()),
        Some(json!(case_results)),
    );

    if all_passed {
        Outcome::Passed(())
    } else {
        Outcome::Failed(format!("{}/{} cases passed", passed, cases.len()))
    }
}
