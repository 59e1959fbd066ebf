//! Pipeline resolver
//!
//! Turns a pipeline display name into the server's pipeline id. Display
//! names are not unique on the server, so the caller picks a policy for
//! duplicates instead of relying on listing order.

use ilab_core::domain::pipeline::{Pipeline, PipelineId};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{HarnessError, Result, Stage};
use crate::repository::PipelineRepository;

/// How to choose among pipelines sharing a display name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateNamePolicy {
    /// Newest `created_at` wins; missing timestamps count as oldest and
    /// ties keep the first listed
    #[default]
    MostRecent,
    /// Fail with `NotFound`, listing the candidates
    Reject,
}

impl fmt::Display for DuplicateNamePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MostRecent => f.write_str("most-recent"),
            Self::Reject => f.write_str("reject"),
        }
    }
}

impl FromStr for DuplicateNamePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "most-recent" | "most_recent" | "latest" => Ok(Self::MostRecent),
            "reject" | "strict" => Ok(Self::Reject),
            other => Err(format!(
                "unknown duplicate name policy '{}' (expected most-recent or reject)",
                other
            )),
        }
    }
}

/// Resolve a pipeline display name to its id
///
/// # Errors
/// Returns an error if:
/// - No pipeline has this display name (`NotFound`)
/// - Several do and the policy is `Reject` (`NotFound`)
/// - The listing call fails (`Request` at the resolve stage)
pub async fn resolve_pipeline_id(
    pipelines: &dyn PipelineRepository,
    display_name: &str,
    policy: DuplicateNamePolicy,
) -> Result<PipelineId> {
    debug!("Resolving pipeline '{}'", display_name);

    let candidates = pipelines
        .find_by_display_name(display_name)
        .await
        .map_err(|source| HarnessError::Request {
            stage: Stage::Resolve,
            source,
        })?;

    let id = select_pipeline(display_name, &candidates, policy)?;
    info!("Resolved pipeline '{}' to {}", display_name, id);
    Ok(id)
}

/// Pick the pipeline for `display_name` from a listing
///
/// Entries with a different display name are ignored.
pub fn select_pipeline(
    display_name: &str,
    candidates: &[Pipeline],
    policy: DuplicateNamePolicy,
) -> Result<PipelineId> {
    let matches: Vec<&Pipeline> = candidates
        .iter()
        .filter(|p| p.display_name == display_name)
        .collect();

    match matches.as_slice() {
        [] => Err(HarnessError::NotFound(format!(
            "no pipeline with display name '{}'",
            display_name
        ))),
        [only] => Ok(only.id.clone()),
        many => {
            let ids: Vec<&str> = many.iter().map(|p| p.id.as_str()).collect();
            match policy {
                DuplicateNamePolicy::Reject => Err(HarnessError::NotFound(format!(
                    "display name '{}' is ambiguous, it matches pipelines: {}",
                    display_name,
                    ids.join(", ")
                ))),
                DuplicateNamePolicy::MostRecent => {
                    // max_by_key keeps the last maximum, so walk in reverse
                    // to let the first listed win ties
                    let newest = many
                        .iter()
                        .rev()
                        .max_by_key(|p| p.created_at)
                        .map(|p| p.id.clone())
                        .ok_or_else(|| HarnessError::NotFound(display_name.to_string()))?;

                    warn!(
                        "Display name '{}' matches {} pipelines ({}); using most recent {}",
                        display_name,
                        many.len(),
                        ids.join(", "),
                        newest
                    );
                    Ok(newest)
                }
            }
        }
    }
}
