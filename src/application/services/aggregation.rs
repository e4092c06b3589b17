//! Partition aggregation service
//!
//! Reads the core and auxiliary partition files, merges their module labels
//! and writes the aggregate file consumed by the significance validator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationResult, IoResultExt, Stage, StageResultExt};
use crate::config::Settings;
use crate::domain::{Aggregate, DomainError, Partition};
use crate::infrastructure::traits::FileSystem;

/// Service for reading and aggregating partition files.
pub struct AggregationService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl AggregationService {
    /// Create a new aggregation service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Read and parse one partition file.
    pub fn read_partition(&self, path: &Path) -> ApplicationResult<Partition> {
        debug!("read_partition: {}", path.display());
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read partition", path)?;
        let partition = Partition::parse(&content, path, &self.settings.comment_marker)?;

        if !partition.duplicates.is_empty() {
            warn!(
                "{}: {} duplicate node id(s), last line wins: {:?}",
                path.display(),
                partition.duplicates.len(),
                partition.duplicates
            );
        }
        debug!(
            "read_partition: {} nodes, {} header lines",
            partition.len(),
            partition.header.lines().len()
        );
        Ok(partition)
    }

    /// Aggregate `paths` into one record per core node.
    ///
    /// The first path is the core partition: it defines the node universe
    /// and supplies header, rank, flow and name. Every further path adds one
    /// module label per node, in argument order.
    #[instrument(skip(self))]
    pub fn aggregate(&self, paths: &[PathBuf]) -> ApplicationResult<Aggregate> {
        let (core_path, rest) = paths
            .split_first()
            .ok_or(DomainError::NoPartitions)
            .stage(Stage::Reading)?;

        let core = self.read_partition(core_path).stage(Stage::Reading)?;
        let mut aggregate = Aggregate::from_core(core);

        for path in rest {
            let partition = self.read_partition(path).stage(Stage::Reading)?;
            let stats = aggregate.absorb(&partition).stage(Stage::Aggregating)?;
            if !stats.ignored.is_empty() {
                warn!(
                    "{}: ignoring {} node(s) not in the core partition",
                    path.display(),
                    stats.ignored.len()
                );
            }
            debug!("aggregate: {} labelled from {}", stats.labelled, path.display());
        }

        debug!(
            "aggregate: {} nodes over {} partitions",
            aggregate.len(),
            aggregate.partitions()
        );
        Ok(aggregate)
    }

    /// Write the aggregate file, replacing any existing file.
    pub fn write_aggregate(&self, aggregate: &Aggregate, path: &Path) -> ApplicationResult<()> {
        debug!("write_aggregate: {}", path.display());
        self.fs
            .ensure_parent(path)
            .with_path_context("create parent directory", path)?;
        self.fs
            .write(path, &aggregate.render())
            .with_path_context("write aggregate file", path)
    }
}
