//! Core domain types
//!
//! These types describe what the harness observes on the pipeline server.
//! They carry no behaviour beyond conversions; all I/O lives in `ilab-client`.

pub mod parameter;
pub mod pipeline;
pub mod run;
