//! End-to-end pipeline
//!
//! Reader → Aggregator → Writer → validator → Reconstructor. Every failure
//! aborts the run and carries the stage it happened in.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::application::{ApplicationResult, Stage, StageResultExt};
use crate::domain::DomainError;

use super::{AggregationService, SignificanceService, TreeService};

/// Inputs and outputs of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    /// Partition files; the first one is the core partition
    pub partitions: Vec<PathBuf>,
    /// Aggregate file handed to the validator
    pub agg_file: PathBuf,
    /// File the validator writes
    pub result_file: PathBuf,
    /// Final tree file
    pub tree_file: PathBuf,
    /// Run the validator (otherwise an existing result file is reused)
    pub run_validator: bool,
    /// Stop once the aggregate file is written
    pub aggregate_only: bool,
}

/// Progress notifications, in pipeline order.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    Partitions { core: &'a Path, rest: &'a [PathBuf] },
    WritingAggregate(&'a Path),
    InvokingValidator {
        program: &'a Path,
        agg_file: &'a Path,
        result_file: &'a Path,
    },
    ValidatorFinished,
    ReadingResult(&'a Path),
    WritingTree(&'a Path),
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub nodes: usize,
    pub partitions: usize,
    pub agg_file: PathBuf,
    /// Set unless the run stopped after aggregation
    pub tree_file: Option<PathBuf>,
    pub insignificant: usize,
}

/// Orchestrates the aggregation, validator and tree services.
pub struct PipelineService {
    aggregation: AggregationService,
    significance: SignificanceService,
    tree: TreeService,
}

impl PipelineService {
    pub fn new(
        aggregation: AggregationService,
        significance: SignificanceService,
        tree: TreeService,
    ) -> Self {
        Self {
            aggregation,
            significance,
            tree,
        }
    }

    /// Run the pipeline, reporting each step to `progress`.
    #[instrument(skip(self, progress))]
    pub fn run(
        &self,
        request: &PipelineRequest,
        mut progress: impl FnMut(Progress<'_>),
    ) -> ApplicationResult<PipelineReport> {
        let (core, rest) = request
            .partitions
            .split_first()
            .ok_or(DomainError::NoPartitions)
            .stage(Stage::Reading)?;
        progress(Progress::Partitions { core, rest });

        let aggregate = self.aggregation.aggregate(&request.partitions)?;

        progress(Progress::WritingAggregate(&request.agg_file));
        self.aggregation
            .write_aggregate(&aggregate, &request.agg_file)
            .stage(Stage::Writing)?;
        info!(
            "aggregated {} nodes from {} partitions into {}",
            aggregate.len(),
            aggregate.partitions(),
            request.agg_file.display()
        );

        let mut report = PipelineReport {
            nodes: aggregate.len(),
            partitions: aggregate.partitions(),
            agg_file: request.agg_file.clone(),
            tree_file: None,
            insignificant: 0,
        };
        if request.aggregate_only {
            return Ok(report);
        }

        if request.run_validator {
            progress(Progress::InvokingValidator {
                program: self.significance.program(),
                agg_file: &request.agg_file,
                result_file: &request.result_file,
            });
            self.significance
                .run(&request.agg_file, &request.result_file)
                .stage(Stage::Invoking)?;
            progress(Progress::ValidatorFinished);
        }

        progress(Progress::ReadingResult(&request.result_file));
        let tree = self
            .tree
            .build(&aggregate, &request.result_file)
            .stage(Stage::Reconstructing)?;

        progress(Progress::WritingTree(&request.tree_file));
        self.tree
            .write(&tree, &request.tree_file)
            .stage(Stage::Writing)?;
        info!(
            "wrote {} tree lines ({} insignificant) to {}",
            tree.lines.len(),
            tree.insignificant(),
            request.tree_file.display()
        );

        report.tree_file = Some(request.tree_file.clone());
        report.insignificant = tree.insignificant();
        Ok(report)
    }
}
