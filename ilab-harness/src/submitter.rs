//! Run submitter
//!
//! Creates exactly one run per call. A create request that failed in
//! transit may still have produced a run, so nothing here retries.

use ilab_core::domain::parameter::ParameterBag;
use ilab_core::domain::pipeline::PipelineId;
use ilab_core::domain::run::{PipelineVersionReference, RunId};
use ilab_core::dto::run::{CreateRun, RuntimeConfig};
use tracing::info;
use uuid::Uuid;

use crate::error::{HarnessError, Result};
use crate::repository::RunRepository;

/// Display name for a new run: the pipeline name plus a short random suffix
pub fn run_display_name(pipeline_display_name: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", pipeline_display_name, &suffix[..8])
}

/// Submit a run of `pipeline_id` with `parameters`
///
/// # Returns
/// The id the server assigned to the new run
///
/// # Errors
/// `Submission` with the server's status and body when the run is rejected,
/// or when the server accepts it without returning a run id.
pub async fn submit_run(
    runs: &dyn RunRepository,
    pipeline_id: &PipelineId,
    pipeline_display_name: &str,
    parameters: &ParameterBag,
) -> Result<RunId> {
    let req = CreateRun {
        display_name: run_display_name(pipeline_display_name),
        description: Some(format!(
            "Verification run of pipeline '{}'",
            pipeline_display_name
        )),
        pipeline_version_reference: PipelineVersionReference {
            pipeline_id: pipeline_id.clone(),
            pipeline_version_id: None,
        },
        runtime_config: RuntimeConfig {
            parameters: parameters.clone(),
        },
    };

    info!(
        "Submitting run '{}' of pipeline {} with {} parameter(s)",
        req.display_name,
        pipeline_id,
        parameters.len()
    );

    let run = runs
        .create_run(&req)
        .await
        .map_err(HarnessError::submission)?;

    if run.run_id.is_empty() {
        return Err(HarnessError::Submission {
            status: None,
            message: "server accepted the run but returned no run_id".to_string(),
        });
    }

    info!("Submitted run {}", run.run_id);
    Ok(run.run_id)
}
