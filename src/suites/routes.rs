//! Routing suite
//!
//! Interactive route alternatives, the older route-options endpoint,
//! popular destinations, invalid-address handling, and the one concurrent
//! fan-out: a fixed batch of requests timed as a group.

use futures::future::join_all;
use serde_json::{json, Value};
use std::time::Instant;

use super::{health_check, status_mismatch, transport_error};
use crate::context::RunContext;
use crate::outcome::Outcome;

/// Metered fare schedule: base CHF 6.60 plus CHF 4.20 per kilometre
const BASE_FARE: f64 = 6.60;
const PER_KM_FARE: f64 = 4.20;

pub async fn run(ctx: &mut RunContext) {
    if !health_check(ctx).await.is_passed() {
        return;
    }

    interactive_routes(ctx, "Interactive Routes - Luzern to Schwyz", "Luzern", "Schwyz").await;
    interactive_routes(ctx, "Interactive Routes - Luzern to Zürich", "Luzern", "Zürich").await;
    interactive_routes(ctx, "Interactive Routes - Schwyz to Zug", "Schwyz", "Zug").await;

    route_options(ctx).await;
    popular_destinations(ctx).await;
    invalid_addresses(ctx).await;
    concurrent_latency(ctx).await;
}

/// `POST /get-interactive-routes` must return four alternatives (fastest,
/// shortest, scenic, avoid_highways) each priced on the metered schedule.
pub async fn interactive_routes(
    ctx: &mut RunContext,
    name: &str,
    origin: &str,
    destination: &str,
) -> Outcome<()> {
    let payload = json!({"origin": origin, "destination": destination});

    let response = match ctx
        .client
        .post_json("/get-interactive-routes", &payload, None)
        .await
    {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, name, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, name, 200, &response);
    }

    let missing: Vec<&str> = ["routes", "comparison", "total_options", "recommended_route"]
        .into_iter()
        .filter(|field| response.body.get(field).is_none())
        .collect();
    if !missing.is_empty() {
        let detail = format!("Missing required fields: {:?}", missing);
        ctx.report.record_fail(name, &detail);
        return Outcome::Failed(detail);
    }

    let Some(routes) = response.body["routes"].as_array() else {
        let detail = format!("Expected routes list, got: {}", response.body["routes"]);
        ctx.report.record_fail(name, &detail);
        return Outcome::Failed(detail);
    };

    if routes.len() != 4 {
        let detail = format!("Expected 4 route options, got {}", routes.len());
        ctx.report.record_fail(name, &detail);
        return Outcome::Failed(detail);
    }

    let route_types: Vec<&str> = routes
        .iter()
        .filter_map(|route| route["route_type"].as_str())
        .collect();
    let expected_types = ["fastest", "shortest", "scenic", "avoid_highways"];
    let types_found = expected_types
        .iter()
        .filter(|expected| route_types.contains(expected))
        .count();

    let route_fields = [
        "route_type",
        "route_description",
        "distance_km",
        "duration_minutes",
        "duration_in_traffic_minutes",
        "base_fare",
        "distance_fare",
        "total_fare",
        "origin_address",
        "destination_address",
        "polyline",
        "bounds",
        "steps",
        "traffic_factor",
    ];

    let mut shapes_ok = true;
    let mut pricing_ok = true;
    for route in routes {
        if route_fields.iter().any(|field| route.get(field).is_none()) {
            shapes_ok = false;
            break;
        }
        let distance = route["distance_km"].as_f64().unwrap_or(f64::NAN);
        let distance_fare = route["distance_fare"].as_f64().unwrap_or(f64::NAN);
        let total_fare = route["total_fare"].as_f64().unwrap_or(f64::NAN);
        let base_fare = route["base_fare"].as_f64().unwrap_or(f64::NAN);

        let expected_distance_fare = distance * PER_KM_FARE;
        let expected_total = BASE_FARE + expected_distance_fare;
        if (distance_fare - expected_distance_fare).abs() >= 0.01
            || (total_fare - expected_total).abs() >= 0.01
            || base_fare != BASE_FARE
        {
            pricing_ok = false;
        }
    }

    if shapes_ok && pricing_ok && types_found >= 3 {
        ctx.report.record(
            name,
            true,
            &format!(
                "4 route alternatives with correct metered pricing ({} expected types)",
                types_found
            ),
            Some(json!({"route_types": route_types})),
        );
        Outcome::Passed(())
    } else {
        let detail = format!(
            "Route validation failed (shapes_ok: {}, pricing_ok: {}, types_found: {})",
            shapes_ok, pricing_ok, types_found
        );
        ctx.report.record_fail(name, &detail);
        Outcome::Failed(detail)
    }
}

/// The older `/calculate-route-options` endpoint stays registered for
/// backward compatibility and must return at least one priced route
pub async fn route_options(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Route Options Endpoint";

    let payload = json!({"origin": "Schwyz", "destination": "Goldau"});

    let response = match ctx
        .client
        .post_json("/calculate-route-options", &payload, None)
        .await
    {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    match response.status {
        200 => {
            let route_count = response
                .body
                .get("routes")
                .and_then(Value::as_array)
                .map(|routes| routes.len())
                .unwrap_or(0);
            if route_count > 0 {
                ctx.report.record_pass(
                    NAME,
                    &format!("Endpoint responding with {} route(s)", route_count),
                );
                Outcome::Passed(())
            } else {
                let detail = format!("No routes in response: {}", response.text);
                ctx.report.record_fail(NAME, &detail);
                Outcome::Failed(detail)
            }
        }
        404 => {
            let detail = "Endpoint not found (404) - not registered".to_string();
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
        _ => status_mismatch(ctx, NAME, 200, &response),
    }
}

/// `GET /popular-destinations/{city}` lists frequent targets with distances
pub async fn popular_destinations(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Popular Destinations Endpoint";

    let response = match ctx.client.get("/popular-destinations/luzern", None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    let destinations = response
        .body
        .get("destinations")
        .and_then(Value::as_array);

    match (response.body.get("origin"), destinations) {
        (Some(_), Some(destinations)) if !destinations.is_empty() => {
            let sample = &destinations[0];
            let has_fields = ["name", "distance_km", "duration_minutes"]
                .iter()
                .all(|field| sample.get(field).is_some());
            if has_fields {
                ctx.report.record(
                    NAME,
                    true,
                    &format!(
                        "Retrieved {} popular destinations from Luzern",
                        destinations.len()
                    ),
                    Some(json!({"destination_count": destinations.len()})),
                );
                Outcome::Passed(())
            } else {
                let detail = format!("Destinations missing required fields: {}", sample);
                ctx.report.record_fail(NAME, &detail);
                Outcome::Failed(detail)
            }
        }
        _ => {
            let detail = format!("Invalid response structure: {}", response.text);
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
    }
}

/// Nonsense addresses must produce a structured rejection, not a 5xx
pub async fn invalid_addresses(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Error Handling - Invalid Addresses";

    let payload = json!({"origin": "XyzInvalidPlace123", "destination": "AnotherFakePlace456"});

    let response = match ctx
        .client
        .post_json("/get-interactive-routes", &payload, None)
        .await
    {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status < 500 {
        ctx.report.record_pass(
            NAME,
            &format!(
                "Invalid addresses handled gracefully (status {})",
                response.status
            ),
        );
        Outcome::Passed(())
    } else {
        let detail = format!("Server error {} for invalid addresses", response.status);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// The one concurrent fan-out in the whole harness: three interactive-route
/// requests issued together and timed as a batch. Passes when at least 80%
/// succeed within 15 seconds total.
pub async fn concurrent_latency(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Performance - Multiple Requests";

    let routes = [
        json!({"origin": "Luzern", "destination": "Zürich"}),
        json!({"origin": "Schwyz", "destination": "Zug"}),
        json!({"origin": "Luzern", "destination": "Schwyz"}),
    ];

    let client = ctx.client.clone();
    let started = Instant::now();

    let requests = routes
        .iter()
        .map(|payload| client.post_json("/get-interactive-routes", payload, None));
    let responses = join_all(requests).await;
    let elapsed = started.elapsed();

    let successful = responses
        .iter()
        .filter(|result| matches!(result, Ok(response) if response.status == 200))
        .count();

    let performance_ok = elapsed.as_secs_f64() < 15.0;
    let success_rate = successful as f64 / routes.len() as f64;

    if performance_ok && success_rate >= 0.8 {
        ctx.report.record(
            NAME,
            true,
            &format!(
                "{}/{} concurrent requests successful in {:.2}s",
                successful,
                routes.len(),
                elapsed.as_secs_f64()
            ),
            Some(json!({
                "total_requests": routes.len(),
                "successful_requests": successful,
                "total_time_seconds": elapsed.as_secs_f64(),
            })),
        );
        Outcome::Passed(())
    } else {
        let detail = format!(
            "{}/{} successful, took {:.2}s",
            successful,
            routes.len(),
            elapsed.as_secs_f64()
        );
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}
