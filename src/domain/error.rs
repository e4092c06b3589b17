//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

use super::NodeId;

/// Domain errors represent malformed input or inconsistent node universes.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("invalid format in {}:{line}: {message}", .path.display())]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("node {node_id} from the core partition is missing in {}", .path.display())]
    MissingNode { node_id: NodeId, path: PathBuf },

    #[error("node {node_id} in {} is not part of the core partition", .path.display())]
    UnknownNode { node_id: NodeId, path: PathBuf },

    #[error("no partition files given")]
    NoPartitions,
}

impl DomainError {
    pub(crate) fn format(path: &std::path::Path, line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }
}
