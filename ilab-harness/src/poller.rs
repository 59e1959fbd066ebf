//! Completion poller
//!
//! Reads a run's status until it succeeds, fails, or the deadline passes.
//! The wait between reads starts at the poll interval and doubles up to a
//! cap. No wait extends past the deadline, so a call returns within
//! `timeout + interval` plus one request timeout.

use ilab_core::domain::run::{Run, RunId, RunStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::error::{HarnessError, Result, Stage};
use crate::repository::RunRepository;

/// Polling parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
    /// Consecutive transient reads tolerated; the next one ends polling
    pub max_read_retries: u32,
}

impl From<&Config> for PollSettings {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.poll_interval,
            max_interval: config.max_poll_interval,
            timeout: config.run_timeout,
            max_read_retries: config.max_read_retries,
        }
    }
}

/// Waits for a submitted run to finish
pub struct CompletionPoller {
    runs: Arc<dyn RunRepository>,
    clock: Arc<dyn Clock>,
    settings: PollSettings,
}

impl CompletionPoller {
    pub fn new(
        runs: Arc<dyn RunRepository>,
        clock: Arc<dyn Clock>,
        settings: PollSettings,
    ) -> Self {
        Self {
            runs,
            clock,
            settings,
        }
    }

    /// Polls `run_id` until it reaches a terminal state
    ///
    /// # Returns
    /// The final run record once the server reports Succeeded
    ///
    /// # Errors
    /// - `RunFailed` as soon as the run is observed Failed
    /// - `Timeout` when the deadline passes first, or when more than
    ///   `max_read_retries` consecutive reads were transient
    /// - `Request` when a read is rejected outright (e.g. 401, 404)
    /// - `Configuration` when the timeout cannot be represented as a deadline
    pub async fn wait_for_success(&self, run_id: &RunId) -> Result<Run> {
        let started = self.clock.now();
        let deadline = started.checked_add(self.settings.timeout).ok_or_else(|| {
            HarnessError::Configuration(format!(
                "run timeout {:?} is too large",
                self.settings.timeout
            ))
        })?;
        let mut interval = self.settings.interval;

        let mut last_status = RunStatus::Unknown;
        let mut consecutive_transient: u32 = 0;
        let mut last_transient: Option<String> = None;
        let mut reads: u32 = 0;

        info!(
            "Polling run {} (interval {:?}, timeout {:?})",
            run_id, self.settings.interval, self.settings.timeout
        );

        loop {
            reads += 1;

            match self.runs.get_run(run_id).await {
                Ok(run) => match run.status() {
                    RunStatus::Succeeded => {
                        info!(
                            "Run {} succeeded after {:?} ({} reads)",
                            run_id,
                            self.clock.now() - started,
                            reads
                        );
                        return Ok(run);
                    }
                    RunStatus::Failed => {
                        let diagnostic = run.diagnostic();
                        warn!("Run {} ended in {}: {}", run_id, run.state, diagnostic);
                        return Err(HarnessError::RunFailed {
                            run_id: run_id.clone(),
                            diagnostic,
                        });
                    }
                    RunStatus::Unknown => {
                        let err = HarnessError::TransientRead {
                            run_id: run_id.clone(),
                            message: format!("server reported state {}", run.state),
                        };
                        consecutive_transient += 1;
                        warn!("{}", err);
                        last_transient = Some(err.to_string());
                    }
                    status @ (RunStatus::Pending | RunStatus::Running) => {
                        consecutive_transient = 0;
                        if status != last_status {
                            info!("Run {} is {}", run_id, status);
                        } else {
                            debug!("Run {} still {}", run_id, status);
                        }
                        last_status = status;
                    }
                },
                Err(e) if e.is_transient() => {
                    let err = HarnessError::TransientRead {
                        run_id: run_id.clone(),
                        message: e.to_string(),
                    };
                    consecutive_transient += 1;
                    warn!(
                        "{} ({}/{})",
                        err, consecutive_transient, self.settings.max_read_retries
                    );
                    last_transient = Some(err.to_string());
                }
                Err(source) => {
                    return Err(HarnessError::Request {
                        stage: Stage::Poll,
                        source,
                    });
                }
            }

            let now = self.clock.now();

            if consecutive_transient > self.settings.max_read_retries || now >= deadline {
                // A read error only explains the timeout while reads are still failing
                let cause = last_transient.filter(|_| consecutive_transient > 0);
                return Err(HarnessError::Timeout {
                    run_id: run_id.clone(),
                    waited: now - started,
                    last_status,
                    cause,
                });
            }

            let pause = interval.min(deadline - now);
            debug!("Next read of run {} in {:?}", run_id, pause);
            self.clock.sleep(pause).await;

            interval = interval.saturating_mul(2).min(self.settings.max_interval);
        }
    }
}
