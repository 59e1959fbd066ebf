//! Run-related API endpoints

use crate::PipelineServerClient;
use crate::error::{ClientError, Result};
use ilab_core::domain::run::{Run, RunId};
use ilab_core::dto::run::CreateRun;

impl PipelineServerClient {
    // =============================================================================
    // Run Lifecycle
    // =============================================================================

    /// Create a new run
    ///
    /// Issues exactly one request. Callers must not retry on error: a request
    /// that timed out may still have created the run.
    ///
    /// # Example
    /// ```no_run
    /// # use ilab_client::PipelineServerClient;
    /// # use ilab_core::domain::parameter::ParameterBag;
    /// # use ilab_core::domain::pipeline::PipelineId;
    /// # use ilab_core::domain::run::PipelineVersionReference;
    /// # use ilab_core::dto::run::{CreateRun, RuntimeConfig};
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = PipelineServerClient::new("http://localhost:8888", "token");
    /// let run = client.create_run(&CreateRun {
    ///     display_name: "ilab-pipeline-smoke".to_string(),
    ///     description: None,
    ///     pipeline_version_reference: PipelineVersionReference {
    ///         pipeline_id: PipelineId::new("pipe-123"),
    ///         pipeline_version_id: None,
    ///     },
    ///     runtime_config: RuntimeConfig {
    ///         parameters: ParameterBag::new().with("train_seed", 42),
    ///     },
    /// }).await?;
    /// println!("Created run {}", run.run_id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_run(&self, req: &CreateRun) -> Result<Run> {
        let url = self.api_url("/runs");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a run by ID
    pub async fn get_run(&self, run_id: &RunId) -> Result<Run> {
        if run_id.is_empty() {
            return Err(ClientError::InvalidRequest("empty run id".to_string()));
        }

        let url = self.api_url(&format!("/runs/{}", run_id));
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
