//! Admin authentication suite
//!
//! Login with correct and incorrect credentials, bearer-token verification,
//! access to a protected endpoint, and rejection of unauthenticated access.

use serde_json::{json, Value};

use super::{health_check, missing_dependency, status_mismatch, transport_error};
use crate::context::RunContext;
use crate::outcome::Outcome;

pub async fn run(ctx: &mut RunContext) {
    if !health_check(ctx).await.is_passed() {
        return;
    }

    let login = login_correct_credentials(ctx).await;
    if let Some(token) = login.value() {
        ctx.refs.admin_token = Some(token);
    }

    login_error_cases(ctx).await;

    if ctx.admin_token().is_some() {
        verify_token(ctx).await;
        protected_endpoint(ctx).await;
    }

    unauthorized_access_rejected(ctx).await;
}

/// Login with the seeded credentials; the token is chained into later
/// admin scenarios.
pub async fn login_correct_credentials(ctx: &mut RunContext) -> Outcome<String> {
    const NAME: &str = "Admin Login - Correct Credentials";

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

    let token = response.str_field("token").unwrap_or_default().to_string();
    let valid = response.bool_field("success") == Some(true)
        && !token.is_empty()
        && response.str_field("message") == Some("Erfolgreich angemeldet")
        && response.body.get("expires_at").is_some();

    if valid {
        ctx.report.record(
            NAME,
            true,
            "Admin login successful with correct credentials",
            Some(json!({
                "message": response.str_field("message"),
                "token_length": token.len(),
                "expires_at": response.body.get("expires_at"),
            })),
        );
        Outcome::Passed(token)
    } else {
        let detail = format!("Invalid response structure: {}", response.text);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// Table of wrong-credential cases. Bad values come back as 200 with
/// `success=false` and the German error message; missing fields are a 422.
pub async fn login_error_cases(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Admin Login - Error Cases";

    struct Case {
        name: &'static str,
        credentials: Value,
        expected_message: Option<&'static str>,
        expected_status: u16,
    }

    let cases = [
        Case {
            name: "Wrong Password",
            credentials: json!({"username": "admin", "password": "wrongpassword"}),
            expected_message: Some("Ungültige Anmeldedaten"),
            expected_status: 200,
        },
        Case {
            name: "Wrong Username",
            credentials: json!({"username": "wronguser", "password": ctx.config.admin_password()}),
            expected_message: Some("Ungültige Anmeldedaten"),
            expected_status: 200,
        },
        Case {
            name: "Empty Password",
            credentials: json!({"username": "admin", "password": ""}),
            expected_message: Some("Ungültige Anmeldedaten"),
            expected_status: 200,
        },
        Case {
            name: "Missing Username",
            credentials: json!({"password": ctx.config.admin_password()}),
            expected_message: None,
            expected_status: 422,
        },
        Case {
            name: "Missing Password",
            credentials: json!({"username": "admin"}),
            expected_message: None,
            expected_status: 422,
        },
    ];

    let mut case_results = Vec::new();

    for case in &cases {
        let line = match ctx
            .client
            .post_json("/auth/admin/login", &case.credentials, None)
            .await
        {
            Ok(response) if response.status == 200 && case.expected_status == 200 => {
                let rejected = response.bool_field("success") == Some(false)
                    && response.str_field("message") == case.expected_message;
                if rejected {
                    format!("ok: {}", case.name)
                } else {
                    format!("mismatch: {} - got {}", case.name, response.text)
                }
            }
            Ok(response) if response.status == case.expected_status => {
                format!("ok: {}", case.name)
            }
            Ok(response) => format!(
                "mismatch: {} - status {} (expected {})",
                case.name, response.status, case.expected_status
            ),
            Err(err) => format!("error: {} - {}", case.name, err),
        };
        case_results.push(line);
    }

    let passed = case_results.iter().filter(|r| r.starts_with("ok")).count();
    let all_passed = passed == cases.len();
    ctx.report.record(
        NAME,
        all_passed,
        &format!("Error handling tests: {}/{} passed", passed, cases.len()),
        Some(json!(case_results)),
    );

    if all_passed {
        Outcome::Passed(())
    } else {
        Outcome::Failed(format!("{}/{} cases passed", passed, cases.len()))
    }
}

/// `POST /auth/admin/verify` with the chained token must confirm the admin role
pub async fn verify_token(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Admin Token Verification";

    let Some(token) = ctx.refs.admin_token.clone() else {
        return missing_dependency(ctx, NAME, "admin token");
    };

    let response = match ctx.client.post_empty("/auth/admin/verify", Some(&token)).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status != 200 {
        return status_mismatch(ctx, NAME, 200, &response);
    }

    let role = response
        .body
        .pointer("/user/role")
        .and_then(Value::as_str);

    if response.bool_field("success") == Some(true) && role == Some("admin") {
        ctx.report.record(
            NAME,
            true,
            "Admin token verification successful",
            Some(json!({
                "user_role": role,
                "username": response.body.pointer("/user/username"),
            })),
        );
        Outcome::Passed(())
    } else {
        let detail = format!("Invalid verification response: {}", response.text);
        ctx.report.record_fail(NAME, &detail);
        Outcome::Failed(detail)
    }
}

/// An admin-only endpoint must answer 200 with a valid bearer token
pub async fn protected_endpoint(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Admin Protected Endpoint Access";

    let Some(token) = ctx.refs.admin_token.clone() else {
        return missing_dependency(ctx, NAME, "admin token");
    };

    let response = match ctx.client.get("/admin/payments", Some(&token)).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status == 200 {
        ctx.report
            .record_pass(NAME, "Protected endpoint accessible with valid token");
        Outcome::Passed(())
    } else {
        status_mismatch(ctx, NAME, 200, &response)
    }
}

/// The same endpoint without any Authorization header must be rejected with 401
pub async fn unauthorized_access_rejected(ctx: &mut RunContext) -> Outcome<()> {
    const NAME: &str = "Unauthorized Access Rejection";

    let response = match ctx.client.get("/admin/payments", None).await {
        Ok(response) => response,
        Err(err) => return transport_error(ctx, NAME, err),
    };

    if response.status == 401 {
        ctx.report
            .record_pass(NAME, "Request without bearer token correctly rejected (401)");
        Outcome::Passed(())
    } else {
        status_mismatch(ctx, NAME, 401, &response)
    }
}
