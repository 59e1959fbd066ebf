//! Pipelines repository

use async_trait::async_trait;
use ilab_client::{PipelineServerClient, Result};
use ilab_core::domain::pipeline::Pipeline;
use std::sync::Arc;

/// Read access to pipeline definitions
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    /// All pipelines whose display name equals `name`, in server order
    async fn find_by_display_name(&self, name: &str) -> Result<Vec<Pipeline>>;
}

/// HTTP implementation of PipelineRepository
pub struct HttpPipelineRepository {
    client: Arc<PipelineServerClient>,
}

impl HttpPipelineRepository {
    pub fn new(client: Arc<PipelineServerClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PipelineRepository for HttpPipelineRepository {
    async fn find_by_display_name(&self, name: &str) -> Result<Vec<Pipeline>> {
        self.client.list_pipelines_by_name(name).await
    }
}
