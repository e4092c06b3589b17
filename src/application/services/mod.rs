//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner)
//! but are themselves concrete structs, not traits.

mod aggregation;
mod pipeline;
mod significance;
mod tree;

pub use aggregation::AggregationService;
pub use pipeline::{PipelineReport, PipelineRequest, PipelineService, Progress};
pub use significance::SignificanceService;
pub use tree::TreeService;
