//! Admin booking deletion suite
//!
//! Deletion is the only destructive admin operation, so the chain creates a
//! throwaway booking first and walks the authorization ladder against it:
//! no token, wrong target, then the real deletion with verification that the
//! record is actually gone.

use serde_json::json;

use super::{auth, health_check, missing_dependency, short_id, status_mismatch, transport_error};
use crate::context::RunContext;
use crate::outcome::Outcome;

pub async fn run(ctx: &mut RunContext) {
    if !health_check(ctx).await.is_passed() {
        return;
    }

    if let Some(token) = auth::login_correct_credentials(ctx).await.value() {
        ctx.refs.admin_token = Some(token);
    }

    let booking_id = create_throwaway_booking(ctx).await.value();

    delete_unauthorized(ctx, booking_id.as_deref()).await;
    delete_nonexistent(ctx).await;
    delete_success(ctx, booking_id.as_deref()).await;
    verify_deleted(ctx, booking_id.as_deref()).await;
    public_delete_of_deleted(ctx, booking_id.as_deref()).await;
    endpoints_still_work(ctx).await;
}

/// A booking created purely to be deleted again
pub async fn create_throwaway_booking(ctx: &mut RunContext) -> Outcome<String> {
    const NAME: &str = "Deletion - Test Booking Creation";

    let payload = json!({
        "customer_name": "Test Deletion User",
        "customer_email": "deletion.test@taxiturlihof.ch",
        "customer_phone": "076 999 88 77",
        "pickup_location": "Luzern",
        "destination": "Zug",
        "booking_type": "scheduled",
        "pickup_datetime": "2025-12-20T10:00:00",
        "passenger_count": 1,
        "vehicle_type": "standard",
        "special_requests": "Deletion workflow test"
    });

    let response = match ctx.client.post_json("/bookings", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    match response.str_field("booking_id") {
        Some(booking_id) if response.bool_field("success") == Some(true) => {
            let booking_id = booking_id.to_string();
            ctx.report.record(
                NAME,
                true,
                &format!(
                    "Test booking created for deletion - ID: {}",
                    short_id(&booking_id)
                ),
                Some(json!({"booking_id": booking_id})),
            );
            Outcome::Passed(booking_id)
        }
        _ => {
            let detail = format!("Booking creation failed: {}", response.text);
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
    }
}

/// Without a bearer token the admin delete route must answer 401
pub async fn delete_unauthorized(
    ctx: &mut RunContext,
    booking_id: Option<&str>,
) -> Outcome<()> {
    const NAME: &str = "Deletion - Unauthorized Access";

    let Some(booking_id) = booking_id else {
        return missing_dependency(ctx, NAME, "booking ID");
    };

    let path = format!("/admin/bookings/{}", booking_id);
    let response = match ctx.client.delete(&path, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status == 401 {
        ctx.report
            .record_pass(NAME, "Correctly rejected unauthorized deletion attempt (401)");
        Outcome::Passed(())
    } else {
        status_mismatch(ctx, NAME, 401, &response)
    }
}

/// Deleting an id that does not exist must be a 404, not a silent success
pub async fn delete_nonexistent(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Deletion - Nonexistent Booking";

    let Some(token) = ctx.refs.admin_token.clone() else {
        return missing_dependency(ctx, NAME, "admin token");
    };

    let response = match ctx
        .client
        .delete("/admin/bookings/nonexistent-booking-id-12345", Some(&token))
        .await
    {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status == 404 {
        ctx.report
            .record_pass(NAME, "Correctly returned 404 for nonexistent booking");
        Outcome::Passed(())
    } else {
        status_mismatch(ctx, NAME, 404, &response)
    }
}

/// The real deletion with the bearer token must succeed
pub async fn delete_success(ctx: &mut RunContext, booking_id: Option<&str>) -> Outcome<()> {
    const NAME: &str = "Deletion - Successful Deletion";

    let Some(token) = ctx.refs.admin_token.clone() else {
        return missing_dependency(ctx, NAME, "admin token");
    };
    let Some(booking_id) = booking_id else {
        return missing_dependency(ctx, NAME, "booking ID");
    };

    // The target must still exist, otherwise the deletion proves nothing
    let precheck = match ctx.client.get(&format!("/bookings/{}", booking_id), None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };
    if precheck.status != 200 {
        let detail = format!(
            "Booking {} missing before deletion (status {})",
            short_id(booking_id),
            precheck.status
        );
        ctx.report.record_fail(NAME, &detail);
        return Outcome::Failed(detail);
    }

    let path = format!("/admin/bookings/{}", booking_id);
    let response = match ctx.client.delete(&path, Some(&token)).await {
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
            &format!(
                "Booking successfully deleted - ID: {}",
                short_id(booking_id)
            ),
            Some(json!({"message": response.str_field("message")})),
        );
        Outcome::Passed(())
    } else {
        let detail = format!("Deletion failed: {}", response.text);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// After deletion the record must be gone: retrieval answers 404
pub async fn verify_deleted(ctx: &mut RunContext, booking_id: Option<&str>) -> Outcome<()> {
    const NAME: &str = "Deletion - Post-deletion Verification";

    let Some(booking_id) = booking_id else {
        return missing_dependency(ctx, NAME, "booking ID");
    };

    let response = match ctx.client.get(&format!("/bookings/{}", booking_id), None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status == 404 {
        ctx.report
            .record_pass(NAME, "Booking confirmed deleted - returns 404 on retrieval");
        Outcome::Passed(())
    } else {
        status_mismatch(ctx, NAME, 404, &response)
    }
}

/// The public cancel route must also treat the deleted id as unknown
pub async fn public_delete_of_deleted(
    ctx: &mut RunContext,
    booking_id: Option<&str>,
) -> Outcome<()> {
    const NAME: &str = "Deletion - Public Cancel of Deleted Booking";

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

    if response.status == 404 {
        ctx.report
            .record_pass(NAME, "Public cancel of deleted booking correctly returns 404");
        Outcome::Passed(())
    } else {
        status_mismatch(ctx, NAME, 404, &response)
    }
}

/// Adding the deletion route must not have broken the neighbouring booking
/// endpoints: create, retrieve, and availability still answer
pub async fn endpoints_still_work(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Deletion - Other Endpoints Verification";

    let payload = json!({
        "customer_name": "Post-Deletion Test User",
        "customer_email": "postdeletion@example.com",
        "customer_phone": "076 111 22 33",
        "pickup_location": "Schwyz",
        "destination": "Luzern",
        "booking_type": "immediate",
        "pickup_datetime": "2025-12-21T15:00:00",
        "passenger_count": 1,
        "vehicle_type": "standard"
    });

    let created = match ctx.client.post_json("/bookings", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };
    if created.status != 200 || created.bool_field("success") != Some(true) {
        let detail = format!(
            "Booking creation broken after deletion change (status {})",
            created.status
        );
        ctx.report.record_fail(NAME, &detail);
        return Outcome::Failed(detail);
    }
    let new_booking_id = created.str_field("booking_id").unwrap_or_default().to_string();

    let retrieved = match ctx
        .client
        .get(&format!("/bookings/{}", new_booking_id), None)
        .await
    {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };
    if retrieved.status != 200 {
        let detail = format!("Booking retrieval broken (status {})", retrieved.status);
        ctx.report.record_fail(NAME, &detail);
        return Outcome::Failed(detail);
    }

    let availability = match ctx.client.get("/availability?date=2025-12-22", None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };
    if availability.status != 200 {
        let detail = format!(
            "Availability endpoint broken (status {})",
            availability.status
        );
        ctx.report.record_fail(NAME, &detail);
        return Outcome::Failed(detail);
    }

    ctx.report.record(
        NAME,
        true,
        "Create, retrieve, and availability endpoints all working after deletion change",
        Some(json!({"new_booking_id": new_booking_id})),
    );
    Outcome::Passed(())
}
