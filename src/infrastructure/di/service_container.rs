//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{
    AggregationService, PipelineService, SignificanceService, TreeService,
};
use crate::config::Settings;
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner::default()),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self { settings, fs, cmd }
    }

    pub fn aggregation(&self) -> AggregationService {
        AggregationService::new(self.fs.clone(), self.settings.clone())
    }

    pub fn significance(&self) -> SignificanceService {
        SignificanceService::new(self.fs.clone(), self.cmd.clone(), self.settings.clone())
    }

    pub fn tree(&self) -> TreeService {
        TreeService::new(self.fs.clone())
    }

    pub fn pipeline(&self) -> PipelineService {
        PipelineService::new(self.aggregation(), self.significance(), self.tree())
    }
}
