//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod entities;
pub mod error;
pub mod partition;
pub mod tree;

pub use aggregate::{AbsorbStats, Aggregate};
pub use entities::*;
pub use error::DomainError;
pub use partition::Partition;
pub use tree::{parse_result, AnnotatedPath, ResultEntry, Tree, TreeLine, TreePath};
