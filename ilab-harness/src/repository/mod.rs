//! Repository layer
//!
//! Repositories are stateless adapters over the pipeline server client.
//! The resolver, submitter and poller only see these traits, so tests can
//! script server behaviour without a network.

mod pipelines;
mod runs;

// Re-export traits
pub use pipelines::PipelineRepository;
pub use runs::RunRepository;

// Re-export implementations
pub use pipelines::HttpPipelineRepository;
pub use runs::HttpRunRepository;
