//! Command execution: settings, services and progress output

use std::env;
use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Generator};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{PipelineReport, PipelineRequest, Progress};
use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::path::derive_result_path;

/// Dispatch the parsed command line.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    if let Some(shell) = cli.generator {
        print_completions(shell);
        return Ok(());
    }

    let settings = load_settings(cli)?;
    if cli.print_config {
        output::info(&settings.to_toml()?);
        return Ok(());
    }

    let request = build_request(cli, &settings)?;
    let container = ServiceContainer::new(settings);
    let report = run_pipeline(&container, &request)?;
    print_report(&report);
    Ok(())
}

fn print_completions<G: Generator>(generator: G) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(generator, &mut cmd, name, &mut io::stdout());
}

/// Layered settings with command-line flags applied last.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = env::current_dir().map_err(|e| InfraError::io("resolve working directory", e))?;
    let mut settings = Settings::load(Some(cwd.as_path()))?;

    if let Some(program) = &cli.validator {
        settings.validator.program = program.clone();
    }
    if let Some(secs) = cli.timeout {
        settings.validator.timeout_secs = secs;
    }
    settings.validate()?;

    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn build_request(cli: &Cli, settings: &Settings) -> CliResult<PipelineRequest> {
    let (Some(agg_file), Some(tree_file)) = (&cli.agg_file, &cli.tree_file) else {
        return Err(CliError::Usage(
            "agg_file and tree_file are required".to_string(),
        ));
    };
    if cli.filenames.is_empty() {
        return Err(CliError::Usage(
            "at least one partition file is required".to_string(),
        ));
    }
    let result_file = cli
        .result_file
        .clone()
        .unwrap_or_else(|| derive_result_path(agg_file, &settings.result_suffix));

    // The result file is deleted before the validator runs.
    let outputs = [agg_file.as_path(), result_file.as_path(), tree_file.as_path()];
    if cli.filenames.iter().any(|f| outputs.contains(&f.as_path())) {
        return Err(CliError::InvalidArgs(
            "output files must differ from the partition files".to_string(),
        ));
    }
    if outputs.iter().tuple_combinations().any(|(a, b)| a == b) {
        return Err(CliError::InvalidArgs(
            "aggregate, result and tree files must be distinct".to_string(),
        ));
    }

    Ok(PipelineRequest {
        partitions: cli.filenames.clone(),
        agg_file: agg_file.clone(),
        result_file,
        tree_file: tree_file.clone(),
        run_validator: !cli.skip_validator,
        aggregate_only: cli.aggregate_only,
    })
}

#[instrument(skip(container))]
fn run_pipeline(container: &ServiceContainer, request: &PipelineRequest) -> CliResult<PipelineReport> {
    let report = container.pipeline().run(request, print_progress)?;
    Ok(report)
}

fn print_progress(progress: Progress<'_>) {
    match progress {
        Progress::Partitions { core, rest } => {
            output::header("Core partition:");
            output::detail(&core.display());
            if !rest.is_empty() {
                output::header("Rest partitions:");
                for path in rest {
                    output::detail(&path.display());
                }
            }
        }
        Progress::WritingAggregate(path) => {
            output::action("Writing", &format!("aggregated partitions to {}", path.display()))
        }
        Progress::InvokingValidator {
            program,
            agg_file,
            result_file,
        } => {
            output::action("Running", &command_line(program, &[agg_file, result_file]));
            output::rule();
        }
        Progress::ValidatorFinished => output::rule(),
        Progress::ReadingResult(path) => {
            output::action("Reading", &format!("result file {}", path.display()))
        }
        Progress::WritingTree(path) => {
            output::action("Writing", &format!("aggregated tree to {}", path.display()))
        }
    }
}

fn command_line(program: &Path, args: &[&Path]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_report(report: &PipelineReport) {
    match &report.tree_file {
        Some(tree_file) => output::success(&format!(
            "{} nodes from {} partitions, {} insignificant: {}",
            report.nodes,
            report.partitions,
            report.insignificant,
            tree_file.display()
        )),
        None => output::success(&format!(
            "{} nodes from {} partitions: {}",
            report.nodes,
            report.partitions,
            report.agg_file.display()
        )),
    }
}
