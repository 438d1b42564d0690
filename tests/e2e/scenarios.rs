use serde_json::json;
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::harness::TestContext;

pub struct Scenario {
    pub name: &'static str,
    pub run: fn(&TestContext) -> Result<(), String>,
}

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "help_output",
            run: scenario_help,
        },
        Scenario {
            name: "no_args_error",
            run: scenario_no_args,
        },
        Scenario {
            name: "list_suites",
            run: scenario_list,
        },
        Scenario {
            name: "unknown_suite",
            run: scenario_unknown_suite,
        },
        Scenario {
            name: "auth_suite_full_pass",
            run: scenario_auth_full_pass,
        },
        Scenario {
            name: "health_gate_blocks_suite",
            run: scenario_health_gate,
        },
        Scenario {
            name: "threshold_override_accepts_partial",
            run: scenario_threshold_override,
        },
        Scenario {
            name: "json_report_output",
            run: scenario_json_report,
        },
        Scenario {
            name: "config_file_base_url",
            run: scenario_config_base_url,
        },
    ]
}

fn scenario_help(ctx: &TestContext) -> Result<(), String> {
    let output = ctx.run_taxicheck(&["--help"])?;
    output.assert_success()?;
    output.assert_stdout_contains("Run a single test suite")?;
    Ok(())
}

fn scenario_no_args(ctx: &TestContext) -> Result<(), String> {
    let output = ctx.run_taxicheck(&[])?;
    output.assert_failure()?;
    output.assert_stderr_contains("No command specified")?;
    Ok(())
}

fn scenario_list(ctx: &TestContext) -> Result<(), String> {
    let output = ctx.run_taxicheck(&["list"])?;
    output.assert_success()?;
    output.assert_stdout_contains("auth")?;
    output.assert_stdout_contains("password-reset")?;
    output.assert_stdout_contains("Admin booking deletion")?;
    Ok(())
}

fn scenario_unknown_suite(ctx: &TestContext) -> Result<(), String> {
    let output = ctx.run_taxicheck(&["run", "scheduler"])?;
    output.assert_failure()?;
    output.assert_stderr_contains("Unknown suite")?;
    Ok(())
}

/// Mocks for a fully healthy auth slice of the backend
fn mount_auth_backend(ctx: &TestContext) -> MockServer {
    let server = ctx.start_healthy_backend();

    ctx.block_on(async {
        let login_ok = json!({
            "success": true,
            "token": "e2e-admin-token",
            "message": "Erfolgreich angemeldet",
            "expires_at": "2026-01-01T00:00:00Z"
        });
        let login_rejected = json!({
            "success": false,
            "message": "Ungültige Anmeldedaten"
        });

        Mock::given(method("POST"))
            .and(path("/auth/admin/login"))
            .and(body_json(
                json!({"username": "admin", "password": "TaxiTurlihof2025!"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_ok))
            .mount(&server)
            .await;

        for bad in [
            json!({"username": "admin", "password": "wrongpassword"}),
            json!({"username": "wronguser", "password": "TaxiTurlihof2025!"}),
            json!({"username": "admin", "password": ""}),
        ] {
            Mock::given(method("POST"))
                .and(path("/auth/admin/login"))
                .and(body_json(bad))
                .respond_with(ResponseTemplate::new(200).set_body_json(login_rejected.clone()))
                .mount(&server)
                .await;
        }

        for incomplete in [
            json!({"password": "TaxiTurlihof2025!"}),
            json!({"username": "admin"}),
        ] {
            Mock::given(method("POST"))
                .and(path("/auth/admin/login"))
                .and(body_json(incomplete))
                .respond_with(ResponseTemplate::new(422).set_body_json(
                    json!({"detail": [{"msg": "field required"}]}),
                ))
                .mount(&server)
                .await;
        }

        Mock::given(method("POST"))
            .and(path("/auth/admin/verify"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "user": {"username": "admin", "role": "admin"}
            })))
            .mount(&server)
            .await;

        // Authorized mock first so it wins over the catch-all 401
        Mock::given(method("GET"))
            .and(path("/admin/payments"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "transactions": []
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/payments"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"detail": "Not authenticated"})),
            )
            .mount(&server)
            .await;
    });

    server
}

fn scenario_auth_full_pass(ctx: &TestContext) -> Result<(), String> {
    let server = mount_auth_backend(ctx);
    let output = ctx.run_taxicheck(&["run", "auth", "--base-url", &server.uri()])?;
    output.assert_success()?;
    output.assert_stdout_contains("[PASS] API Health Check")?;
    output.assert_stdout_contains("[PASS] Admin Login - Correct Credentials")?;
    output.assert_stdout_contains("[PASS] Admin Token Verification")?;
    output.assert_stdout_contains("[PASS] Unauthorized Access Rejection")?;
    output.assert_stdout_not_contains("[FAIL]")?;
    Ok(())
}

fn scenario_health_gate(ctx: &TestContext) -> Result<(), String> {
    let server = ctx.start_backend();
    ctx.block_on(
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server),
    );

    let output = ctx.run_taxicheck(&["run", "auth", "--base-url", &server.uri()])?;
    output.assert_failure()?;
    output.assert_stdout_contains("[FAIL] API Health Check")?;
    // The gate must stop the suite before any login scenario runs
    output.assert_stdout_not_contains("Admin Login")?;
    Ok(())
}

fn scenario_threshold_override(ctx: &TestContext) -> Result<(), String> {
    let server = ctx.start_backend();
    ctx.block_on(
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server),
    );

    let output = ctx.run_taxicheck(&[
        "run",
        "auth",
        "--base-url",
        &server.uri(),
        "--threshold",
        "0",
    ])?;
    output.assert_success()?;
    output.assert_stdout_contains("[FAIL] API Health Check")?;
    Ok(())
}

fn scenario_json_report(ctx: &TestContext) -> Result<(), String> {
    let server = mount_auth_backend(ctx);
    let output = ctx.run_taxicheck(&["run", "auth", "--base-url", &server.uri(), "--json"])?;
    output.assert_success()?;
    output.assert_stdout_contains("\"results\"")?;
    output.assert_stdout_contains("\"success\": true")?;
    output.assert_stdout_contains("\"name\": \"API Health Check\"")?;
    Ok(())
}

fn scenario_config_base_url(ctx: &TestContext) -> Result<(), String> {
    let server = mount_auth_backend(ctx);
    let config = format!(r#"{{"base_url": "{}"}}"#, server.uri());

    let output = ctx.run_taxicheck_with_config(&["run", "auth"], Some(&config))?;
    output.assert_success()?;
    output.assert_stdout_contains(&format!("Testing backend at: {}", server.uri()))?;
    output.assert_stdout_not_contains("[FAIL]")?;
    Ok(())
}
