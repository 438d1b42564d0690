use clap::{Parser, Subcommand};
use std::fmt;
use std::str::FromStr;

/// Integration test CLI for the Taxi Türlihof booking API
#[derive(Parser, Debug)]
#[command(name = "taxicheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Base URL of the backend under test
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Print the full report as JSON after the run
    #[arg(long, global = true)]
    pub json: bool,

    /// Override the suite's pass-rate gate (0.0 - 1.0)
    #[arg(long, global = true)]
    pub threshold: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a single test suite
    Run {
        /// Suite to run
        suite: Suite,
    },
    /// Run every suite against the backend
    All,
    /// List available suites
    List,
}

/// Test suites, one per slice of the backend API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suite {
    Auth,
    Booking,
    Pricing,
    Routes,
    Payments,
    Capture,
    PasswordReset,
    Contact,
    Admin,
}

impl Suite {
    pub const ALL: [Suite; 9] = [
        Suite::Auth,
        Suite::Booking,
        Suite::Pricing,
        Suite::Routes,
        Suite::Payments,
        Suite::Capture,
        Suite::PasswordReset,
        Suite::Contact,
        Suite::Admin,
    ];

    /// Default pass-rate gate for the suite.
    ///
    /// Most suites require a clean run; the routes and admin-deletion
    /// suites historically tolerated flaky upstream services and accept 80%.
    pub fn default_threshold(&self) -> f64 {
        match self {
            Suite::Routes | Suite::Admin => 0.8,
            _ => 1.0,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Suite::Auth => "Admin login, token verification, protected endpoints",
            Suite::Booking => "Booking creation, retrieval, status updates, validation",
            Suite::Pricing => "Swiss distance and fare calculation bands",
            Suite::Routes => "Route options, interactive routes, popular destinations",
            Suite::Payments => "Payment methods, initiation (Stripe/TWINT/PayPal), status",
            Suite::Capture => "Manual-capture payment workflow (admin capture/cancel)",
            Suite::PasswordReset => "Admin password reset request/verify/complete flows",
            Suite::Contact => "Contact form submission and email notification triggers",
            Suite::Admin => "Admin booking deletion and authorization checks",
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suite::Auth => write!(f, "auth"),
            Suite::Booking => write!(f, "booking"),
            Suite::Pricing => write!(f, "pricing"),
            Suite::Routes => write!(f, "routes"),
            Suite::Payments => write!(f, "payments"),
            Suite::Capture => write!(f, "capture"),
            Suite::PasswordReset => write!(f, "password-reset"),
            Suite::Contact => write!(f, "contact"),
            Suite::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Suite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auth" | "login" => Ok(Suite::Auth),
            "booking" | "bookings" => Ok(Suite::Booking),
            "pricing" | "price" | "distance" => Ok(Suite::Pricing),
            "routes" | "routing" => Ok(Suite::Routes),
            "payments" | "payment" => Ok(Suite::Payments),
            "capture" | "auth-capture" => Ok(Suite::Capture),
            "password-reset" | "reset" => Ok(Suite::PasswordReset),
            "contact" | "email" => Ok(Suite::Contact),
            "admin" | "deletion" => Ok(Suite::Admin),
            _ => Err(format!(
                "Unknown suite '{}'. Supported: auth, booking, pricing, routes, payments, capture, password-reset, contact, admin",
                s
            )),
        }
    }
}
