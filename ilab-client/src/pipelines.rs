//! Pipeline-related API endpoints

use crate::PipelineServerClient;
use crate::error::{ClientError, Result};
use ilab_core::domain::pipeline::Pipeline;
use ilab_core::dto::pipeline::{Filter, ListPipelinesResponse};
use tracing::debug;

/// Page size requested when listing pipelines
const PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched in one listing, guarding against a server
/// that keeps handing out tokens
const MAX_PAGES: usize = 1000;

impl PipelineServerClient {
    // =============================================================================
    // Pipeline Listing
    // =============================================================================

    /// Fetch one page of pipelines
    ///
    /// # Arguments
    /// * `filter` - Optional server-side filter
    /// * `page_token` - Token from the previous page, `None` for the first
    pub async fn list_pipelines_page(
        &self,
        filter: Option<&Filter>,
        page_token: Option<&str>,
    ) -> Result<ListPipelinesResponse> {
        let url = self.api_url("/pipelines");

        let mut query: Vec<(&str, String)> = vec![("page_size", PAGE_SIZE.to_string())];
        if let Some(filter) = filter {
            let encoded = serde_json::to_string(filter)
                .map_err(|e| ClientError::InvalidRequest(format!("Unencodable filter: {}", e)))?;
            query.push(("filter", encoded));
        }
        if let Some(token) = page_token {
            query.push(("page_token", token.to_string()));
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .query(&query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List every pipeline whose display name is exactly `name`
    ///
    /// Pages are followed until the server stops returning a token. The
    /// server-side filter is re-checked locally, since some servers ignore
    /// unknown filter keys and return everything.
    ///
    /// # Example
    /// ```no_run
    /// # use ilab_client::PipelineServerClient;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = PipelineServerClient::new("http://localhost:8888", "token");
    /// let matches = client.list_pipelines_by_name("ilab-pipeline").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_pipelines_by_name(&self, name: &str) -> Result<Vec<Pipeline>> {
        let filter = Filter::display_name_equals(name);
        let mut matches = Vec::new();
        let mut page_token: Option<String> = None;

        for page in 0..MAX_PAGES {
            let response = self
                .list_pipelines_page(Some(&filter), page_token.as_deref())
                .await?;

            debug!(
                "Pipeline list page {} returned {} pipeline(s)",
                page,
                response.pipelines.len()
            );

            page_token = response.next_page().map(str::to_string);
            matches.extend(
                response
                    .pipelines
                    .into_iter()
                    .filter(|p| p.display_name == name),
            );

            if page_token.is_none() {
                return Ok(matches);
            }
        }

        Err(ClientError::ParseError(format!(
            "Pipeline listing did not terminate after {} pages",
            MAX_PAGES
        )))
    }
}
