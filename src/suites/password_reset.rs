//! Admin password reset suite
//!
//! The backend runs the reset channel in mock mode: tokens and codes are
//! printed to its console instead of being delivered. The harness can
//! therefore only exercise the negative paths - fabricated tokens and codes
//! must be rejected - plus the request endpoints and the invariant that the
//! current credentials keep working afterwards.

use serde_json::{json, Value};

use super::{health_check, status_mismatch, transport_error};
use crate::context::RunContext;
use crate::outcome::Outcome;

pub async fn run(ctx: &mut RunContext) {
    if !health_check(ctx).await.is_passed() {
        return;
    }

    reset_status(ctx).await;
    request_reset(ctx, "Password Reset Email Request", "email").await;
    request_reset(ctx, "Password Reset SMS Request", "sms").await;
    verify_fabricated_token(ctx).await;
    verify_fabricated_code(ctx).await;
    complete_with_fabricated_token(ctx).await;
    invalid_method(ctx).await;
    missing_token_or_code(ctx).await;
    current_credentials_still_work(ctx).await;
}

/// `GET /admin/password-reset/status` reports the available channels and
/// whether delivery is mocked
pub async fn reset_status(ctx: &mut RunContext) -> Outcome<bool> {
    const NAME: &str = "Password Reset Status Check";

    let response = match ctx.client.get("/admin/password-reset/status", None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    let missing: Vec<&str> = ["success", "available_methods", "mock_mode"]
        .into_iter()
        .filter(|field| response.body.get(field).is_none())
        .collect();
    if !missing.is_empty() {
        let detail = format!("Missing required fields: {:?}", missing);
        ctx.report.record_fail(NAME, &detail);
        return Outcome::Failed(detail);
    }

    let email = response
        .body
        .pointer("/available_methods/email")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let sms = response
        .body
        .pointer("/available_methods/sms")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let mock_mode = response.bool_field("mock_mode").unwrap_or(false);

    ctx.report.record(
        NAME,
        true,
        &format!(
            "Status endpoint working - Email: {}, SMS: {}, Mock: {}",
            email, sms, mock_mode
        ),
        Some(json!({"available_methods": {"email": email, "sms": sms}, "mock_mode": mock_mode})),
    );
    Outcome::Passed(mock_mode)
}

/// Requesting a reset over a valid channel succeeds and echoes the method
pub async fn request_reset(ctx: &mut RunContext, name: &str, method: &str) -> Outcome<()> {
    let payload = json!({"method": method});

    let response = match ctx
        .client
        .post_json("/admin/password-reset/request", &payload, None)
        .await
    {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, name, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, name, 200, &response);
    }

    if response.bool_field("success") == Some(true) && response.str_field("method") == Some(method) {
        ctx.report.record_pass(
            name,
            &format!(
                "{} reset request successful: {}",
                method,
                response.str_field("message").unwrap_or("")
            ),
        );
        Outcome::Passed(())
    } else {
        let detail = format!("Invalid response: {}", response.text);
        ctx.report.record_fail(name, &detail);
        Outcome::Failed(detail)
    }
}

/// A token the backend never issued must be rejected with 400
pub async fn verify_fabricated_token(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Password Reset Token Verify (Fabricated)";
    let payload = json!({"token": "mock_email_token_for_testing_123456"});
    expect_reset_rejection(ctx, NAME, "/admin/password-reset/verify", payload).await
}

/// Same for a fabricated 6-digit SMS code
pub async fn verify_fabricated_code(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Password Reset Code Verify (Fabricated)";
    let payload = json!({"code": "123456"});
    expect_reset_rejection(ctx, NAME, "/admin/password-reset/verify", payload).await
}

/// Completing a reset with a fabricated token must be rejected before the
/// password is ever considered
pub async fn complete_with_fabricated_token(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Password Reset Complete (Fabricated Token)";
    let payload = json!({
        "token": "mock_email_token_for_testing_123456",
        "new_password": "NewSecurePassword2025!"
    });
    expect_reset_rejection(ctx, NAME, "/admin/password-reset/complete", payload).await
}

/// An unsupported channel name must be a 400
pub async fn invalid_method(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Invalid Reset Method Handling";
    let payload = json!({"method": "invalid_method"});
    expect_reset_rejection(ctx, NAME, "/admin/password-reset/request", payload).await
}

/// An empty verify payload must be a 400
pub async fn missing_token_or_code(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Missing Token/Code Handling";
    let payload = json!({});
    expect_reset_rejection(ctx, NAME, "/admin/password-reset/verify", payload).await
}

async fn expect_reset_rejection(
    ctx: &mut RunContext,
    name: &str,
    path: &str,
    payload: Value,
) -> Outcome<()> {
    let response = match ctx.client.post_json(path, &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, name, err),
    };

    if response.status == 400 {
        ctx.report.record(
            name,
            true,
            "Request correctly rejected (400)",
            Some(json!({"response": response.body})),
        );
        Outcome::Passed(())
    } else {
        status_mismatch(ctx, name, 400, &response)
    }
}

/// After all the failed reset attempts the seeded credentials must still
/// log in: nothing above may have touched the stored password
pub async fn current_credentials_still_work(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Admin Login With Current Password";

    let payload = json!({
        "username": ctx.config.admin_username(),
        "password": ctx.config.admin_password(),
    });

    let response = match ctx.client.post_json("/auth/admin/login", &payload, None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    if response.bool_field("success") == Some(true) {
        ctx.report
            .record_pass(NAME, "Current password still valid after failed reset attempts");
        Outcome::Passed(())
    } else {
        let detail = format!("Current credentials rejected: {}", response.text);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}
