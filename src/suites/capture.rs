//! Manual-capture payment workflow suite
//!
//! Stripe payments are authorized at checkout and only charged when an
//! admin captures them. This suite walks the chain: admin login, fresh
//! booking, manual-capture initiation, then admin capture and cancel. A
//! payment that is not yet `authorized` must be rejected with a clean 400,
//! which the precondition scenarios treat as the expected answer.

use serde_json::json;

use super::{auth, booking, health_check, missing_dependency, payments, status_mismatch, transport_error};
use crate::context::RunContext;
use crate::outcome::Outcome;

pub async fn run(ctx: &mut RunContext) {
    if !health_check(ctx).await.is_passed() {
        return;
    }

    if let Some(token) = auth::login_correct_credentials(ctx).await.value() {
        ctx.refs.admin_token = Some(token);
    }

    admin_payments_list(ctx).await;

    let booking_id = booking::create_standard(ctx).await.value();
    if let Some(ref id) = booking_id {
        ctx.refs.booking_id = Some(id.clone());
    }

    let initiated = payments::initiate(
        ctx,
        "Manual Capture Payment Initiation",
        booking_id.as_deref(),
        "stripe",
    )
    .await;
    if let Some((session_id, transaction_id)) = initiated.value() {
        ctx.refs.session_id = Some(session_id);
        ctx.refs.transaction_id = Some(transaction_id);
    }

    let transaction_id = ctx.refs.transaction_id.clone();
    // The checkout was never completed, so the transaction is still in
    // `processing`: both admin actions must answer with the 400 rejection.
    capture_not_authorized(ctx, transaction_id.as_deref()).await;
    cancel_not_authorized(ctx, transaction_id.as_deref()).await;

    let booking_id = ctx.refs.booking_id.clone();
    booking_payment_state(ctx, booking_id.as_deref()).await;
}

/// `GET /admin/payments` with the bearer token lists all transactions
pub async fn admin_payments_list(ctx: &mut RunContext) -> Outcome<usize> {
    const NAME: &str = "Admin Payments Endpoint";

    let Some(token) = ctx.refs.admin_token.clone() else {
        return missing_dependency(ctx, NAME, "admin token");
    };

    let response = match ctx.client.get("/admin/payments", Some(&token)).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    match (
        response.bool_field("success"),
        response.body.get("transactions").and_then(serde_json::Value::as_array),
    ) {
        (Some(true), Some(transactions)) => {
            ctx.report.record(
                NAME,
                true,
                &format!("Retrieved {} payment transactions", transactions.len()),
                Some(json!({"transaction_count": transactions.len()})),
            );
            Outcome::Passed(transactions.len())
        }
        _ => {
            let detail = format!("Invalid response structure: {}", response.text);
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
    }
}

/// Capturing a payment that is not in `authorized` state must come back as
/// a graceful 400, never a crash
pub async fn capture_not_authorized(
    ctx: &mut RunContext,
    transaction_id: Option<&str>,
) -> Outcome<()> {
    const NAME: &str = "Capture Rejected Before Authorization";
    admin_action_rejected(ctx, NAME, transaction_id, "capture").await
}

/// Cancelling has the same precondition as capturing
pub async fn cancel_not_authorized(
    ctx: &mut RunContext,
    transaction_id: Option<&str>,
) -> Outcome<()> {
    const NAME: &str = "Cancel Rejected Before Authorization";
    admin_action_rejected(ctx, NAME, transaction_id, "cancel").await
}

async fn admin_action_rejected(
    ctx: &mut RunContext,
    name: &str,
    transaction_id: Option<&str>,
    action: &str,
) -> Outcome<()> {
    let Some(token) = ctx.refs.admin_token.clone() else {
        return missing_dependency(ctx, name, "admin token");
    };
    let Some(transaction_id) = transaction_id else {
        return missing_dependency(ctx, name, "transaction ID");
    };

    let path = format!("/admin/payments/{}/{}", transaction_id, action);
    let response = match ctx.client.post_empty(&path, Some(&token)).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, name, err),
    };

    match response.status {
        400 => {
            ctx.report.record(
                name,
                true,
                &format!(
                    "{} correctly rejected for non-authorized payment (400)",
                    action
                ),
                Some(json!({"transaction_id": transaction_id})),
            );
            Outcome::Passed(())
        }
        200 => {
            // The backend let the action through; the precondition is broken
            let detail = format!(
                "{} succeeded although the payment was never authorized: {}",
                action, response.text
            );
            ctx.report.record_fail(name, &detail);
            Outcome::Failed(detail)
        }
        _ => status_mismatch(ctx, name, 400, &response),
    }
}

/// The booking document mirrors the payment state; after initiation it must
/// carry a payment_status field in a known in-flight state
pub async fn booking_payment_state(
    ctx: &mut RunContext,
    booking_id: Option<&str>,
) -> Outcome<String> {
    const NAME: &str = "Booking Payment State";

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

    match response.str_field("payment_status") {
        Some(state) if !state.is_empty() => {
            let state = state.to_string();
            ctx.report.record(
                NAME,
                true,
                &format!("Booking payment state: {}", state),
                Some(json!({"booking_id": booking_id, "payment_status": state})),
            );
            Outcome::Passed(state)
        }
        _ => {
            let detail = format!("Booking has no payment_status: {}", response.text);
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
    }
}
