//! iLab pipeline end-to-end check
//!
//! Resolves the configured pipeline on a pipeline server, starts one run
//! with the InstructLab parameter set and waits for it to succeed.
//!
//! Exit status: 0 when the run succeeded or the check is disabled
//! (ENABLE_ILAB_PIPELINE_TEST unset), 1 on any failure.

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ilab_harness::{Outcome, run_from_env};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ilab_harness=info,ilab_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .context("Failed to initialize logging")?;

    info!("Starting iLab pipeline verification");

    let outcome = run_from_env().await;

    match &outcome {
        Outcome::Passed { .. } => info!("{}", outcome),
        Outcome::Skipped { .. } => warn!("{}", outcome),
        Outcome::Failed { .. } => error!("{}", outcome),
    }

    Ok(outcome.exit_code())
}
