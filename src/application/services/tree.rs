//! Tree reconstruction service

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::{parse_result, Aggregate, Tree};
use crate::infrastructure::traits::FileSystem;

/// Rebuilds the final tree file from the validator's result file.
pub struct TreeService {
    fs: Arc<dyn FileSystem>,
}

impl TreeService {
    /// Create a new tree service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Read `result_file` and rebuild the tree against `aggregate`.
    pub fn build(&self, aggregate: &Aggregate, result_file: &Path) -> ApplicationResult<Tree> {
        let content = self
            .fs
            .read_to_string(result_file)
            .with_path_context("read result file", result_file)?;
        let entries = parse_result(&content, result_file)?;
        debug!("build: {} result entries", entries.len());

        Ok(Tree::reconstruct(aggregate, &entries, result_file)?)
    }

    /// Write the tree file, replacing any existing file.
    pub fn write(&self, tree: &Tree, tree_file: &Path) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(tree_file)
            .with_path_context("create parent directory", tree_file)?;
        self.fs
            .write(tree_file, &tree.render())
            .with_path_context("write tree file", tree_file)?;

        debug!(
            "write: {} lines, {} insignificant",
            tree.lines.len(),
            tree.insignificant()
        );
        Ok(())
    }

    /// Rebuild the tree and write it to `tree_file`.
    #[instrument(skip(self, aggregate))]
    pub fn reconstruct(
        &self,
        aggregate: &Aggregate,
        result_file: &Path,
        tree_file: &Path,
    ) -> ApplicationResult<Tree> {
        let tree = self.build(aggregate, result_file)?;
        self.write(&tree, tree_file)?;
        Ok(tree)
    }
}
