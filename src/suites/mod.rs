//! Test suites, one module per slice of the backend API
//!
//! Each suite exposes `run(ctx)` which sequences its scenarios, respecting
//! data dependencies (a payment needs a booking, a capture needs an admin
//! token). Scenarios record exactly one result each and return an
//! [`Outcome`] so dependents can short-circuit without panicking.

pub mod admin;
pub mod auth;
pub mod booking;
pub mod capture;
pub mod contact;
pub mod password_reset;
pub mod payments;
pub mod pricing;
pub mod routes;

use crate::cli::Suite;
use crate::client::ClientError;
use crate::context::RunContext;
use crate::outcome::Outcome;

/// Dispatch a suite by name
pub async fn run_suite(suite: Suite, ctx: &mut RunContext) {
    println!();
    println!("=== {} suite: {} ===", suite, suite.description());
    match suite {
        Suite::Auth => auth::run(ctx).await,
        Suite::Booking => booking::run(ctx).await,
        Suite::Pricing => pricing::run(ctx).await,
        Suite::Routes => routes::run(ctx).await,
        Suite::Payments => payments::run(ctx).await,
        Suite::Capture => capture::run(ctx).await,
        Suite::PasswordReset => password_reset::run(ctx).await,
        Suite::Contact => contact::run(ctx).await,
        Suite::Admin => admin::run(ctx).await,
    }
}

/// Shared opening scenario: the backend root must answer before a suite
/// spends time on its real scenarios.
pub async fn health_check(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "API Health Check";

    let response = match ctx.client.get("/", None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        let detail = format!("API returned status {}", response.status);
        ctx.report.record_fail(NAME, &detail);
        return Outcome::Failed(detail);
    }

    match response.str_field("message") {
        Some("Hello World") => {
            ctx.report.record(
                NAME,
                true,
                "Backend API is running (Status: 200)",
                Some(response.body.clone()),
            );
            Outcome::Passed(())
        }
        _ => {
            let detail = format!("Unexpected response content: {}", response.text);
            ctx.report.record_fail(NAME, &detail);
            Outcome::Failed(detail)
        }
    }
}

/// First eight characters of a backend-issued id, for display. Ids are
/// usually UUIDs, but the backend is free to return anything, so this must
/// stay safe on multi-byte characters.
pub(crate) fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Record a transport failure and produce the matching outcome
pub(crate) fn transport_error<T>(
    ctx: &mut RunContext,
    name: &str,
    err: ClientError,
) -> Outcome<T> {
    let detail = err.to_string();
    ctx.report
        .record(name, false, &format!("Request failed: {}", detail), None);
    Outcome::Error(detail)
}

/// Record a short-circuit when an upstream scenario did not produce the
/// reference this one depends on
pub(crate) fn missing_dependency<T>(
    ctx: &mut RunContext,
    name: &str,
    dependency: &str,
) -> Outcome<T> {
    let detail = format!("No {} available from earlier scenario", dependency);
    ctx.report.record_fail(name, &detail);
    Outcome::Failed(detail)
}

/// Record a status-code mismatch with expected-vs-actual detail
pub(crate) fn status_mismatch<T>(
    ctx: &mut RunContext,
    name: &str,
    expected: u16,
    response: &crate::client::ApiResponse,
) -> Outcome<T> {
    let detail = format!(
        "Expected status {}, got {}: {}",
        expected, response.status, response.text
    );
    ctx.report.record_fail(name, &detail);
    Outcome::Failed(detail)
}
