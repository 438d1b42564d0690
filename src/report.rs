//! Result recording and console reporting
//!
//! Every scenario records exactly one `TestResult`, printed as it happens.
//! The report keeps the ordered list for the end-of-run summary and for the
//! `--json` output mode.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Outcome of a single scenario, immutable once recorded
#[derive(Debug, Clone, Serialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

/// Aggregate counts for a finished run
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

/// Ordered run report
#[derive(Debug, Default, Serialize)]
pub struct Report {
    pub results: Vec<TestResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one scenario outcome and print it immediately.
    ///
    /// Must never fail: it is called from every exit path of every scenario.
    pub fn record(&mut self, name: &str, success: bool, message: &str, details: Option<Value>) {
        let marker = if success { "PASS" } else { "FAIL" };
        println!("[{}] {}: {}", marker, name, message);
        if let Some(ref detail) = details {
            match serde_json::to_string(detail) {
                Ok(rendered) => println!("       {}", rendered),
                Err(_) => println!("       (unprintable details)"),
            }
        }

        self.results.push(TestResult {
            name: name.to_string(),
            success,
            message: message.to_string(),
            details,
            timestamp: Utc::now(),
        });
    }

    pub fn record_pass(&mut self, name: &str, message: &str) {
        self.record(name, true, message, None);
    }

    pub fn record_fail(&mut self, name: &str, message: &str) {
        self.record(name, false, message, None);
    }

    pub fn summary(&self) -> Summary {
        let total = self.results.len();
        let passed = self.results.iter().filter(|r| r.success).count();
        let pass_rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };
        Summary {
            total,
            passed,
            failed: total - passed,
            pass_rate,
        }
    }

    /// Whether the run clears the suite's pass-rate gate
    pub fn meets(&self, threshold: f64) -> bool {
        self.summary().pass_rate >= threshold
    }

    /// Print the end-of-run summary: totals, failures, pass percentage
    pub fn print_summary(&self, label: &str) {
        let summary = self.summary();
        println!();
        println!("{}", "=".repeat(60));
        println!("{} summary", label);
        println!("{}", "=".repeat(60));
        println!("Total:  {}", summary.total);
        println!("Passed: {}", summary.passed);
        println!("Failed: {}", summary.failed);
        println!("Rate:   {:.1}%", summary.pass_rate * 100.0);

        if summary.failed > 0 {
            println!();
            println!("Failed scenarios:");
            for result in self.results.iter().filter(|r| !r.success) {
                println!("  - {}: {}", result.name, result.message);
            }
        }
        println!("{}", "=".repeat(60));
    }
}

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    }
}
