//! Data Transfer Objects for the pipeline server API
//!
//! Field names follow the server's snake_case JSON. Every optional field is
//! tolerant of being absent, since servers omit empty values.

pub mod pipeline;
pub mod run;
