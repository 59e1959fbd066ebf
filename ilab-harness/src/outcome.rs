//! Result of one harness invocation

use ilab_core::domain::pipeline::PipelineId;
use ilab_core::domain::run::RunId;
use std::fmt;
use std::process::ExitCode;

use crate::error::{HarnessError, Stage};

/// Skipped, Passed or Failed
///
/// Skipped is distinct from Passed: nothing was verified.
#[derive(Debug)]
pub enum Outcome {
    Skipped {
        reason: String,
    },
    Passed {
        pipeline_id: PipelineId,
        run_id: RunId,
    },
    Failed {
        stage: Stage,
        error: HarnessError,
    },
}

impl Outcome {
    pub fn failed(error: HarnessError) -> Self {
        Self::Failed {
            stage: error.stage(),
            error,
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Process exit status: a skip does not fail the calling job
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Skipped { .. } | Self::Passed { .. } => ExitCode::SUCCESS,
            Self::Failed { .. } => ExitCode::FAILURE,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped { reason } => write!(f, "SKIPPED: {}", reason),
            Self::Passed {
                pipeline_id,
                run_id,
            } => write!(
                f,
                "PASSED: run {} of pipeline {} succeeded",
                run_id, pipeline_id
            ),
            Self::Failed { stage, error } => write!(f, "FAILED at {} stage: {}", stage, error),
        }
    }
}
