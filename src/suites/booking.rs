//! Booking lifecycle suite
//!
//! Creation for each vehicle type, retrieval, status update, cancellation,
//! the validation table, not-found handling, lookup, and availability.

use serde_json::{json, Value};

use super::{health_check, missing_dependency, short_id, status_mismatch, transport_error};
use crate::context::RunContext;
use crate::outcome::Outcome;

pub async fn run(ctx: &mut RunContext) {
    if !health_check(ctx).await.is_passed() {
        return;
    }

    let created = create_standard(ctx).await;
    if let Some(booking_id) = created.value() {
        ctx.refs.booking_id = Some(booking_id);
    }

    create_premium_van(ctx).await;
    create_immediate(ctx).await;

    let booking_id = ctx.refs.booking_id.clone();
    retrieve(ctx, booking_id.as_deref()).await;
    update_status(ctx, booking_id.as_deref()).await;
    lookup(ctx, booking_id.as_deref()).await;

    validation_table(ctx).await;
    retrieve_unknown_id(ctx).await;
    list_all(ctx).await;
    availability(ctx).await;

    cancel(ctx, booking_id.as_deref()).await;
}

/// Standard scheduled booking; the returned id is chained into the
/// retrieval, status, payment, and deletion scenarios.
pub async fn create_standard(ctx: &mut RunContext) -> Outcome<String> {
    const NAME: &str = "Booking Creation - Standard";

    let payload = json!({
        "customer_name": "Max Mustermann",
        "customer_email": "max.mustermann@example.com",
        "customer_phone": "076 123 45 67",
        "pickup_location": "Luzern",
        "destination": "Zürich Flughafen",
        "booking_type": "scheduled",
        "pickup_datetime": "2025-12-10T14:30:00",
        "passenger_count": 2,
        "vehicle_type": "standard",
        "special_requests": "Kindersitz benötigt"
    });

    let response = match ctx.client.post_json("/bookings", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    let missing: Vec<&str> = ["success", "booking_id", "message", "booking_details"]
        .into_iter()
        .filter(|field| response.body.get(field).is_none())
        .collect();
    if !missing.is_empty() {
        let detail = format!("Missing required fields: {:?}", missing);
        ctx.report.record_fail(NAME, &detail);
        return Outcome::Failed(detail);
    }

    let booking_id = response
        .str_field("booking_id")
        .unwrap_or_default()
        .to_string();
    let details = &response.body["booking_details"];

    let valid = response.bool_field("success") == Some(true)
        && !booking_id.is_empty()
        && details["customer_name"] == payload["customer_name"]
        && details["vehicle_type"] == "standard"
        && details["passenger_count"] == 2
        && details.get("total_fare").is_some()
        && details["booking_fee"].as_f64() == Some(5.0);

    if valid {
        ctx.report.record(
            NAME,
            true,
            &format!(
                "Standard booking created - ID: {}, Total: CHF {}",
                short_id(&booking_id),
                details["total_fare"]
            ),
            Some(json!({
                "booking_id": booking_id,
                "total_fare": details["total_fare"],
                "booking_fee": details["booking_fee"],
                "vehicle_type": details["vehicle_type"],
            })),
        );
        Outcome::Passed(booking_id)
    } else {
        let detail = format!("Booking validation failed: {}", details);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// Premium van booking with an additional stop
pub async fn create_premium_van(ctx: &mut RunContext) -> Outcome<String> {
    const NAME: &str = "Booking Creation - Premium Van";

    let payload = json!({
        "customer_name": "Anna Schmidt",
        "customer_email": "anna.schmidt@example.com",
        "customer_phone": "077 987 65 43",
        "pickup_location": "Zug",
        "destination": "Basel Flughafen",
        "additional_stops": ["Luzern Bahnhof"],
        "booking_type": "scheduled",
        "pickup_datetime": "2025-12-12T08:00:00",
        "passenger_count": 6,
        "vehicle_type": "premium_van",
        "special_requests": "Viel Gepäck"
    });

    create_and_validate(ctx, NAME, payload, "premium_van").await
}

/// Immediate booking: no pickup_datetime, dispatched right away
pub async fn create_immediate(ctx: &mut RunContext) -> Outcome<String> {
    const NAME: &str = "Booking Creation - Immediate";

    let payload = json!({
        "customer_name": "Peter Weber",
        "customer_email": "peter.weber@example.com",
        "customer_phone": "078 555 44 33",
        "pickup_location": "Luzern Bahnhof",
        "destination": "Zürich",
        "booking_type": "immediate",
        "passenger_count": 1,
        "vehicle_type": "standard"
    });

    create_and_validate(ctx, NAME, payload, "standard").await
}

async fn create_and_validate(
    ctx: &mut RunContext,
    name: &str,
    payload: Value,
    vehicle_type: &str,
) -> Outcome<String> {
    let response = match ctx.client.post_json("/bookings", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, name, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, name, 200, &response);
    }

    let booking_id = response
        .str_field("booking_id")
        .unwrap_or_default()
        .to_string();
    let details = &response.body["booking_details"];

    let valid = response.bool_field("success") == Some(true)
        && !booking_id.is_empty()
        && details["vehicle_type"] == vehicle_type
        && details["booking_fee"].as_f64() == Some(5.0);

    if valid {
        ctx.report.record(
            name,
            true,
            &format!(
                "Booking created - ID: {}, Total: CHF {}",
                short_id(&booking_id),
                details["total_fare"]
            ),
            Some(json!({
                "booking_id": booking_id,
                "total_fare": details["total_fare"],
                "vehicle_type": details["vehicle_type"],
            })),
        );
        Outcome::Passed(booking_id)
    } else {
        let detail = format!("Booking validation failed: {}", response.text);
        ctx.report.record_fail(name, &detail);
        Outcome::Failed(detail)
    }
}

/// Retrieval must echo the id and carry the core booking fields
pub async fn retrieve(ctx: &mut RunContext, booking_id: Option<&str>) -> Outcome<()> {
    const NAME: &str = "Booking Retrieval";

    let Some(booking_id) = booking_id else {
        return missing_dependency(ctx, NAME, "booking ID");
    };

    let response = match ctx.client.get(&format!("/bookings/{}", booking_id), None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    let missing: Vec<&str> = [
        "id",
        "customer_name",
        "pickup_location",
        "destination",
        "total_fare",
    ]
    .into_iter()
    .filter(|field| response.body.get(field).is_none())
    .collect();

    if missing.is_empty() && response.str_field("id") == Some(booking_id) {
        ctx.report.record_pass(
            NAME,
            &format!(
                "Booking retrieved - {}, CHF {}",
                response.str_field("customer_name").unwrap_or("?"),
                response.body["total_fare"]
            ),
        );
        Outcome::Passed(())
    } else {
        let detail = format!("Invalid booking data or ID mismatch: {}", response.text);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// Status updates go through a query parameter, not a JSON body
pub async fn update_status(ctx: &mut RunContext, booking_id: Option<&str>) -> Outcome<()> {
    const NAME: &str = "Booking Status Update";

    let Some(booking_id) = booking_id else {
        return missing_dependency(ctx, NAME, "booking ID");
    };

    let path = format!("/bookings/{}/status?status=confirmed", booking_id);
    let response = match ctx.client.put_empty(&path, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    if response.bool_field("success") == Some(true) {
        ctx.report.record(
            NAME,
            true,
            "Booking status updated to confirmed",
            Some(json!({"booking_id": booking_id, "new_status": "confirmed"})),
        );
        Outcome::Passed(())
    } else {
        let detail = format!("Status update failed: {}", response.text);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// Customer-facing lookup by (partial) id and email
pub async fn lookup(ctx: &mut RunContext, booking_id: Option<&str>) -> Outcome<()> {
    const NAME: &str = "Booking Lookup";

    let payload = json!({
        "booking_id": booking_id.map(short_id).unwrap_or("test"),
        "email": "max.mustermann@example.com"
    });

    let response = match ctx.client.post_json("/bookings/lookup", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    match (
        response.bool_field("success"),
        response.body.get("bookings").and_then(Value::as_array),
    ) {
        (Some(true), Some(bookings)) => {
            ctx.report.record(
                NAME,
                true,
                &format!("Booking lookup successful - found {} booking(s)", bookings.len()),
                Some(json!({"bookings_found": bookings.len()})),
            );
            Outcome::Passed(())
        }
        _ => {
            let detail = format!("Invalid response structure: {}", response.text);
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
    }
}

/// Required-field and range violations must all come back as 422
pub async fn validation_table(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Booking Validation";

    let cases: [(&str, Value); 4] = [
        (
            "Missing Customer Name",
            json!({
                "customer_email": "test@example.com",
                "customer_phone": "076 123 45 67",
                "pickup_location": "Luzern",
                "destination": "Zürich",
                "pickup_datetime": "2025-12-10T14:30:00"
            }),
        ),
        (
            "Invalid Email Format",
            json!({
                "customer_name": "Test User",
                "customer_email": "invalid-email",
                "customer_phone": "076 123 45 67",
                "pickup_location": "Luzern",
                "destination": "Zürich",
                "pickup_datetime": "2025-12-10T14:30:00"
            }),
        ),
        (
            "Invalid Passenger Count",
            json!({
                "customer_name": "Test User",
                "customer_email": "test@example.com",
                "customer_phone": "076 123 45 67",
                "pickup_location": "Luzern",
                "destination": "Zürich",
                "pickup_datetime": "2025-12-10T14:30:00",
                "passenger_count": 0
            }),
        ),
        (
            "Missing Pickup Location",
            json!({
                "customer_name": "Test User",
                "customer_email": "test@example.com",
                "customer_phone": "076 123 45 67",
                "destination": "Zürich",
                "pickup_datetime": "2025-12-10T14:30:00"
            }),
        ),
    ];

    let mut case_results = Vec::new();
    for (case_name, payload) in &cases {
        let line = match ctx.client.post_json("/bookings", payload, None).await {
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

/// An unknown id is a clean 404, not a server error
pub async fn retrieve_unknown_id(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Booking Retrieval - Unknown ID";

    let response = match ctx
        .client
        .get("/bookings/00000000-0000-0000-0000-000000000000", None)
        .await
    {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status == 404 {
        ctx.report
            .record_pass(NAME, "Unknown booking ID correctly answered 404");
        Outcome::Passed(())
    } else {
        status_mismatch(ctx, NAME, 404, &response)
    }
}

/// `GET /bookings` returns the full list
pub async fn list_all(ctx: &mut RunContext) -> Outcome<usize> {
    const NAME: &str = "All Bookings Retrieval";

    let response = match ctx.client.get("/bookings", None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    match response.body.as_array() {
        Some(bookings) => {
            ctx.report
                .record_pass(NAME, &format!("Retrieved {} bookings", bookings.len()));
            Outcome::Passed(bookings.len())
        }
        None => {
            let detail = format!("Expected a list, got: {}", response.text);
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
    }
}

/// Slot listing for a fixed date; slots are HH:MM strings
pub async fn availability(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Availability Endpoint";

    let response = match ctx.client.get("/availability?date=2025-12-10", None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    let slots = response
        .body
        .get("available_slots")
        .and_then(Value::as_array);

    match (response.body.get("date"), slots) {
        (Some(_), Some(slots)) if !slots.is_empty() => {
            let well_formed = slots.iter().take(3).all(|slot| {
                slot.as_str()
                    .map(|s| s.len() == 5 && s.as_bytes()[2] == b':')
                    .unwrap_or(false)
            });
            if well_formed {
                ctx.report.record(
                    NAME,
                    true,
                    &format!("Retrieved {} available time slots for 2025-12-10", slots.len()),
                    Some(json!({"slot_count": slots.len(), "sample_slots": &slots[..slots.len().min(5)]})),
                );
                Outcome::Passed(())
            } else {
                let detail = format!("Invalid slot format: {:?}", &slots[..slots.len().min(3)]);
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

/// Cancellation is a public DELETE; it closes out the chained booking
pub async fn cancel(ctx: &mut RunContext, booking_id: Option<&str>) -> Outcome<()> {
    const NAME: &str = "Booking Cancellation";

    let Some(booking_id) = booking_id else {
        return missing_dependency(ctx, NAME, "booking ID");
    };

    let response = match ctx
        .client
        .delete(&format!("/bookings/{}", booking_id), None)
        .await
    {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    if response.bool_field("success") == Some(true) {
        ctx.report.record(
            NAME,
            true,
            "Booking cancelled successfully",
            Some(json!({"booking_id": booking_id})),
        );
        Outcome::Passed(())
    } else {
        let detail = format!("Cancellation failed: {}", response.text);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}
