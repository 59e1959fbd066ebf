//! Harness orchestration
//!
//! Runs resolve → submit → poll in sequence and turns the result into an
//! `Outcome`. Each step consumes the previous step's output; the first
//! error stops the flow.

use ilab_client::PipelineServerClient;
use ilab_core::domain::pipeline::PipelineId;
use ilab_core::domain::run::{Run, RunId};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::clock::{Clock, TokioClock};
use crate::config::{Config, ENABLE_VAR};
use crate::error::{HarnessError, Result};
use crate::outcome::Outcome;
use crate::poller::{CompletionPoller, PollSettings};
use crate::repository::{
    HttpPipelineRepository, HttpRunRepository, PipelineRepository, RunRepository,
};
use crate::resolver::resolve_pipeline_id;
use crate::submitter::submit_run;

/// A successful verification
#[derive(Debug, Clone)]
pub struct Verified {
    pub pipeline_id: PipelineId,
    pub run: Run,
}

/// Verification harness bound to one configuration
pub struct Harness {
    config: Config,
    pipelines: Arc<dyn PipelineRepository>,
    runs: Arc<dyn RunRepository>,
    clock: Arc<dyn Clock>,
    /// Run ids handed out by the server during this session
    submitted: HashSet<RunId>,
}

impl Harness {
    /// Creates a harness talking to the configured pipeline server
    pub fn new(config: Config) -> Result<Self> {
        Self::with_clock(config, Arc::new(TokioClock))
    }

    /// Like `new`, with a custom time source for the poller
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.insecure_tls)
            .build()
            .map_err(|e| {
                HarnessError::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        let client = Arc::new(PipelineServerClient::with_client(
            config.server_url.clone(),
            config.bearer_token.clone(),
            http_client,
        ));

        Ok(Self::with_repositories(
            config,
            Arc::new(HttpPipelineRepository::new(Arc::clone(&client))),
            Arc::new(HttpRunRepository::new(client)),
            clock,
        ))
    }

    /// Creates a harness over arbitrary repositories
    pub fn with_repositories(
        config: Config,
        pipelines: Arc<dyn PipelineRepository>,
        runs: Arc<dyn RunRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            pipelines,
            runs,
            clock,
            submitted: HashSet::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve the pipeline, submit one run and wait for it to succeed
    pub async fn verify(&mut self) -> Result<Verified> {
        let name = self.config.pipeline_display_name.clone();

        info!(
            "Verifying pipeline '{}' on {}",
            name, self.config.server_url
        );

        let pipeline_id =
            resolve_pipeline_id(self.pipelines.as_ref(), &name, self.config.duplicate_policy)
                .await?;

        let run_id = submit_run(
            self.runs.as_ref(),
            &pipeline_id,
            &name,
            &self.config.parameters,
        )
        .await?;

        if !self.submitted.insert(run_id.clone()) {
            return Err(HarnessError::Submission {
                status: None,
                message: format!(
                    "server returned run id {} which was already issued in this session",
                    run_id
                ),
            });
        }

        let poller = CompletionPoller::new(
            Arc::clone(&self.runs),
            Arc::clone(&self.clock),
            PollSettings::from(&self.config),
        );
        let run = poller.wait_for_success(&run_id).await?;

        Ok(Verified { pipeline_id, run })
    }

    /// `verify`, reported as an `Outcome`
    pub async fn run(&mut self) -> Outcome {
        match self.verify().await {
            Ok(verified) => {
                info!(
                    "Run {} of pipeline {} completed successfully",
                    verified.run.run_id, verified.pipeline_id
                );
                Outcome::Passed {
                    pipeline_id: verified.pipeline_id,
                    run_id: verified.run.run_id,
                }
            }
            Err(e) => Outcome::failed(e),
        }
    }
}

/// Runs the harness configured from the process environment
pub async fn run_from_env() -> Outcome {
    run_with_env(|key| std::env::var(key).ok()).await
}

/// Runs the harness configured from `lookup`
///
/// Without the enable flag nothing is read beyond the flag itself and the
/// outcome is Skipped. Configuration problems fail before any request.
pub async fn run_with_env(lookup: impl Fn(&str) -> Option<String>) -> Outcome {
    if !Config::enabled(&lookup) {
        let reason = format!(
            "Skipping iLab pipeline test. Set {}=true to enable.",
            ENABLE_VAR
        );
        debug!("{}", reason);
        return Outcome::Skipped { reason };
    }

    let harness = Config::from_lookup(&lookup).and_then(Harness::new);

    match harness {
        Ok(mut harness) => harness.run().await,
        Err(e) => Outcome::failed(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::Stage;
    use crate::testing::{FakePipelines, FakeRuns, Read, pipeline};
    use ilab_core::domain::run::RuntimeState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::util::SubscriberInitExt;

    /// Counts ERROR events
    struct ErrorEvents(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ErrorEvents {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::ERROR {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn config() -> Config {
        let mut config = Config::new("http://localhost:8888", "token", "ilab-pipeline");
        config.poll_interval = Duration::from_secs(30);
        config.run_timeout = Duration::from_secs(600);
        config
    }

    fn harness(pipelines: Arc<FakePipelines>, runs: Arc<FakeRuns>) -> Harness {
        Harness::with_repositories(config(), pipelines, runs, Arc::new(ManualClock::new()))
    }

    #[tokio::test]
    async fn test_resolve_submit_poll() {
        let pipelines = Arc::new(FakePipelines::new(vec![pipeline(
            "pipe-123",
            "ilab-pipeline",
            None,
        )]));
        let runs = Arc::new(FakeRuns::new(
            vec![Ok("run-456")],
            vec![
                Read::State(RuntimeState::Pending),
                Read::State(RuntimeState::Running),
                Read::State(RuntimeState::Succeeded),
            ],
        ));

        let outcome = harness(pipelines, runs.clone()).run().await;
        match outcome {
            Outcome::Passed {
                pipeline_id,
                run_id,
            } => {
                assert_eq!(pipeline_id.as_str(), "pipe-123");
                assert_eq!(run_id.as_str(), "run-456");
            }
            other => panic!("unexpected outcome: {other}"),
        }
        assert_eq!(runs.create_calls(), 1);
    }

    #[tokio::test]
    async fn test_rejected_submission_skips_polling() {
        let pipelines = Arc::new(FakePipelines::new(vec![pipeline(
            "pipe-123",
            "ilab-pipeline",
            None,
        )]));
        let runs = Arc::new(FakeRuns::new(
            vec![Err((400, r#"{"error":"invalid parameter sdg_pipeline"}"#))],
            vec![Read::State(RuntimeState::Succeeded)],
        ));

        let outcome = harness(pipelines, runs.clone()).run().await;
        match outcome {
            Outcome::Failed { stage, error } => {
                assert_eq!(stage, Stage::Submit);
                assert!(error.to_string().contains("invalid parameter sdg_pipeline"));
            }
            other => panic!("unexpected outcome: {other}"),
        }
        assert_eq!(runs.read_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_pipeline_skips_submission() {
        let pipelines = Arc::new(FakePipelines::new(Vec::new()));
        let runs = Arc::new(FakeRuns::new(vec![Ok("run-456")], Vec::new()));

        let outcome = harness(pipelines, runs.clone()).run().await;
        assert!(matches!(outcome, Outcome::Failed { stage: Stage::Resolve, .. }));
        assert_eq!(runs.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_reused_run_id_is_rejected() {
        let pipelines = Arc::new(FakePipelines::new(vec![pipeline(
            "pipe-123",
            "ilab-pipeline",
            None,
        )]));
        let runs = Arc::new(FakeRuns::new(
            vec![Ok("run-456"), Ok("run-456")],
            vec![Read::State(RuntimeState::Succeeded)],
        ));

        let mut harness = harness(pipelines, runs);
        assert!(harness.run().await.is_passed());

        let err = harness.verify().await.unwrap_err();
        assert!(matches!(err, HarnessError::Submission { .. }));
        assert!(err.to_string().contains("already issued"));
    }

    #[tokio::test]
    async fn test_skipped_without_flag() {
        let outcome = run_with_env(|_| None).await;
        assert!(outcome.is_skipped());
    }

    #[tokio::test]
    async fn test_missing_url_fails_before_any_request() {
        let outcome = run_with_env(|key| match key {
            "ENABLE_ILAB_PIPELINE_TEST" => Some("true".to_string()),
            "BEARER_TOKEN" => Some("token".to_string()),
            "PIPELINE_DISPLAY_NAME" => Some("ilab-pipeline".to_string()),
            _ => None,
        })
        .await;

        match outcome {
            Outcome::Failed { stage, error } => {
                assert_eq!(stage, Stage::Configuration);
                assert!(error.to_string().contains("PIPELINE_SERVER_URL"));
            }
            other => panic!("unexpected outcome: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failure_is_left_to_the_caller_to_log() {
        let errors = Arc::new(AtomicUsize::new(0));
        let _guard = tracing_subscriber::registry()
            .with(ErrorEvents(Arc::clone(&errors)))
            .set_default();

        let pipelines = Arc::new(FakePipelines::new(vec![pipeline(
            "pipe-123",
            "ilab-pipeline",
            None,
        )]));
        let runs = Arc::new(FakeRuns::new(
            vec![Err((400, r#"{"error":"invalid parameter sdg_pipeline"}"#))],
            Vec::new(),
        ));

        let outcome = harness(pipelines, runs).run().await;
        assert!(matches!(outcome, Outcome::Failed { stage: Stage::Submit, .. }));

        let outcome = run_with_env(|key| match key {
            "ENABLE_ILAB_PIPELINE_TEST" => Some("true".to_string()),
            _ => None,
        })
        .await;
        assert!(matches!(outcome, Outcome::Failed { stage: Stage::Configuration, .. }));

        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }
}
