//! Deployment runner
//!
//! Normalises `requirements.txt`, installs it, collects static files, and
//! reminds the operator to restart. Stops at the first failing step.
//!
//! # Usage
//!
//! ```bash
//! DEPLOY_PYTHON=python3 DEPLOY_PIP=pip3 cargo run --bin deploy
//! ```

use std::process::ExitCode;
use ticketing::config::Config;
use ticketing::deploy::{DeployPlan, RESTART_REMINDER};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> ExitCode {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticketing=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let plan = DeployPlan::from_config(&config.deploy);

    match plan.run() {
        Ok(_) => {
            println!("{RESTART_REMINDER}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Deployment failed");
            eprintln!("deployment failed: {err}");
            ExitCode::FAILURE
        }
    }
}
