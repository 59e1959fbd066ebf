//! iLab pipeline verification harness
//!
//! Verifies a deployed pipeline server end to end:
//! - Resolver: pipeline display name → pipeline id
//! - Submitter: one run with the configured parameters → run id
//! - Poller: run id → Succeeded, or a failure naming the stage
//!
//! The steps run strictly in sequence. Configuration comes from the
//! environment and is validated before any request is made.

pub mod clock;
pub mod config;
pub mod error;
pub mod harness;
pub mod outcome;
pub mod parameters;
pub mod poller;
pub mod repository;
pub mod resolver;
pub mod submitter;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{HarnessError, Result, Stage};
pub use harness::{Harness, run_from_env, run_with_env};
pub use outcome::Outcome;
