//! Harness error taxonomy
//!
//! Every error names the stage it came from so a failed verification says
//! where it stopped. Server diagnostics are carried verbatim.

use ilab_client::ClientError;
use ilab_core::domain::run::{RunId, RunStatus};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;

/// Step of the verification flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Configuration,
    Resolve,
    Submit,
    Poll,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configuration => "configuration",
            Self::Resolve => "resolve",
            Self::Submit => "submit",
            Self::Poll => "poll",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Required settings missing or malformed; raised before any request
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No usable pipeline for the display name
    #[error("Pipeline not found: {0}")]
    NotFound(String),

    /// The server did not accept the run
    #[error("Run submission failed{}: {message}", status_suffix(.status))]
    Submission {
        /// HTTP status, when the server answered
        status: Option<u16>,
        message: String,
    },

    /// The run reached a terminal non-success state
    #[error("Run {run_id} failed: {diagnostic}")]
    RunFailed { run_id: RunId, diagnostic: String },

    /// The run was still not terminal when the deadline passed, or too many
    /// consecutive reads told us nothing
    #[error(
        "Run {run_id} did not complete within {waited:?} (last known status: {last_status}){}",
        cause_suffix(.cause)
    )]
    Timeout {
        run_id: RunId,
        waited: Duration,
        last_status: RunStatus,
        cause: Option<String>,
    },

    /// A single status read failed in a way worth repeating
    #[error("Transient read failure for run {run_id}: {message}")]
    TransientRead { run_id: RunId, message: String },

    /// The server could not be queried for a reason not covered above
    #[error("Pipeline server request failed during {stage}: {source}")]
    Request {
        stage: Stage,
        #[source]
        source: ClientError,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {})", s)).unwrap_or_default()
}

fn cause_suffix(cause: &Option<String>) -> String {
    cause
        .as_ref()
        .map(|c| format!("; last read error: {}", c))
        .unwrap_or_default()
}

impl HarnessError {
    pub fn stage(&self) -> Stage {
        match self {
            Self::Configuration(_) => Stage::Configuration,
            Self::NotFound(_) => Stage::Resolve,
            Self::Submission { .. } => Stage::Submit,
            Self::RunFailed { .. } | Self::Timeout { .. } | Self::TransientRead { .. } => {
                Stage::Poll
            }
            Self::Request { stage, .. } => *stage,
        }
    }

    /// A rejected run creation, keeping the server's response body verbatim
    pub fn submission(err: ClientError) -> Self {
        let status = err.status();
        let message = match err {
            ClientError::ApiError { message, .. } => message,
            other => other.to_string(),
        };
        Self::Submission { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_of_each_error() {
        assert_eq!(
            HarnessError::Configuration("x".into()).stage(),
            Stage::Configuration
        );
        assert_eq!(HarnessError::NotFound("x".into()).stage(), Stage::Resolve);
        assert_eq!(
            HarnessError::Submission {
                status: None,
                message: "x".into()
            }
            .stage(),
            Stage::Submit
        );
        assert_eq!(
            HarnessError::RunFailed {
                run_id: RunId::new("r"),
                diagnostic: "x".into()
            }
            .stage(),
            Stage::Poll
        );
        assert_eq!(
            HarnessError::Request {
                stage: Stage::Resolve,
                source: ClientError::api_error(401, "denied"),
            }
            .stage(),
            Stage::Resolve
        );
    }

    #[test]
    fn test_submission_keeps_body_verbatim() {
        let err = HarnessError::submission(ClientError::api_error(
            400,
            r#"{"error":"invalid parameter sdg_pipeline"}"#,
        ));
        assert_eq!(
            err.to_string(),
            r#"Run submission failed (status 400): {"error":"invalid parameter sdg_pipeline"}"#
        );
    }

    #[test]
    fn test_timeout_message_names_last_status() {
        let err = HarnessError::Timeout {
            run_id: RunId::new("run-456"),
            waited: Duration::from_secs(600),
            last_status: RunStatus::Running,
            cause: None,
        };
        let message = err.to_string();
        assert!(message.contains("run-456"));
        assert!(message.contains("last known status: Running"));
        assert!(!message.contains("last read error"));
    }
}
