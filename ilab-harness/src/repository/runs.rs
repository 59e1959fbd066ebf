//! Runs repository

use async_trait::async_trait;
use ilab_client::{PipelineServerClient, Result};
use ilab_core::domain::run::{Run, RunId};
use ilab_core::dto::run::CreateRun;
use std::sync::Arc;

/// Run creation and status reads
#[async_trait]
pub trait RunRepository: Send + Sync {
    /// Creates one run; a single request, never repeated
    async fn create_run(&self, req: &CreateRun) -> Result<Run>;

    /// Reads the current state of a run; idempotent
    async fn get_run(&self, run_id: &RunId) -> Result<Run>;
}

/// HTTP implementation of RunRepository
pub struct HttpRunRepository {
    client: Arc<PipelineServerClient>,
}

impl HttpRunRepository {
    pub fn new(client: Arc<PipelineServerClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RunRepository for HttpRunRepository {
    async fn create_run(&self, req: &CreateRun) -> Result<Run> {
        self.client.create_run(req).await
    }

    async fn get_run(&self, run_id: &RunId) -> Result<Run> {
        self.client.get_run(run_id).await
    }
}
