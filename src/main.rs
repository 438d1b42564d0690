mod cli;
mod client;
mod config;
mod context;
mod outcome;
mod report;
mod suites;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, Suite};
use client::ApiClient;
use config::Config;
use context::RunContext;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Run { suite }) => run_suites(&[suite], &cli).await,
        Some(Command::All) => run_suites(&Suite::ALL, &cli).await,
        Some(Command::List) => {
            run_list();
            Ok(true)
        }
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            std::process::exit(1);
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the given suites in order against one shared context.
///
/// Returns whether every suite cleared its pass-rate gate. A Ctrl-C
/// interrupts between awaits and exits with the conventional 130.
async fn run_suites(
    suites_to_run: &[Suite],
    cli: &Cli,
) -> Result<bool, Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(ref base_url) = cli.base_url {
        config.base_url = Some(base_url.clone());
    }

    let client = ApiClient::new(config.base_url())?;
    println!("Testing backend at: {}", client.base_url());

    let mut ctx = RunContext::new(client, config);
    let mut all_passed = true;

    for &suite in suites_to_run {
        let before = ctx.report.results.len();

        tokio::select! {
            _ = suites::run_suite(suite, &mut ctx) => {}
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nInterrupted");
                ctx.report.print_summary("Interrupted run");
                std::process::exit(130);
            }
        }

        let threshold = cli.threshold.unwrap_or_else(|| ctx.config.threshold(suite));
        let suite_results = &ctx.report.results[before..];
        let passed = suite_results.iter().filter(|r| r.success).count();
        let total = suite_results.len();
        let rate = if total == 0 {
            0.0
        } else {
            passed as f64 / total as f64
        };

        if rate < threshold {
            all_passed = false;
        }
        println!(
            "\n{} suite: {}/{} passed ({:.1}%, gate {:.0}%)",
            suite,
            passed,
            total,
            rate * 100.0,
            threshold * 100.0
        );
    }

    ctx.report.print_summary("Overall");

    if cli.json {
        report::print_json(&ctx.report);
    }

    Ok(all_passed)
}

fn run_list() {
    println!("Available suites:");
    for suite in Suite::ALL {
        println!("  {:<16} {}", suite.to_string(), suite.description());
    }
}
