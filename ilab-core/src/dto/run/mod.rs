//! Run DTOs

use serde::{Deserialize, Serialize};

use crate::domain::parameter::ParameterBag;
use crate::domain::run::PipelineVersionReference;

/// Body of `POST /apis/v2beta1/runs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRun {
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pipeline_version_reference: PipelineVersionReference,
    pub runtime_config: RuntimeConfig,
}

/// Parameters handed to the pipeline at run time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub parameters: ParameterBag,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pipeline::PipelineId;

    #[test]
    fn test_create_run_body() {
        let req = CreateRun {
            display_name: "ilab-pipeline-1a2b3c4d".to_string(),
            description: None,
            pipeline_version_reference: PipelineVersionReference {
                pipeline_id: PipelineId::new("pipe-123"),
                pipeline_version_id: None,
            },
            runtime_config: RuntimeConfig {
                parameters: ParameterBag::new().with("train_seed", 42),
            },
        };

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "display_name": "ilab-pipeline-1a2b3c4d",
                "pipeline_version_reference": { "pipeline_id": "pipe-123" },
                "runtime_config": { "parameters": { "train_seed": 42 } }
            })
        );
    }
}
