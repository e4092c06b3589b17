//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult, Stage};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// self.fs.read_to_string(path)
    ///     .with_path_context("read partition", path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait for tagging any application result with its pipeline stage.
pub trait StageResultExt<T> {
    fn stage(self, stage: Stage) -> ApplicationResult<T>;
}

impl<T, E: Into<ApplicationError>> StageResultExt<T> for Result<T, E> {
    fn stage(self, stage: Stage) -> ApplicationResult<T> {
        self.map_err(|e| e.into().in_stage(stage))
    }
}
