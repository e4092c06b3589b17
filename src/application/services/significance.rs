//! Significance clustering invocation
//!
//! The validator is an external executable called as
//! `<program> <agg_file> <result_file>`. It must exit successfully and
//! leave the result file behind.

use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// Runs the external significance validator.
pub struct SignificanceService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl SignificanceService {
    /// Create a new significance service.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
    ) -> Self {
        Self { fs, cmd, settings }
    }

    /// Validator executable in use.
    pub fn program(&self) -> &Path {
        &self.settings.validator.program
    }

    /// Run the validator on `agg_file`, producing `result_file`.
    ///
    /// A stale result file is removed first so a validator that exits
    /// without writing one cannot be mistaken for success.
    ///
    /// # Errors
    /// `ApplicationError::Validator` when the program cannot be started,
    /// times out, exits non-zero or does not create `result_file`.
    #[instrument(skip(self))]
    pub fn run(&self, agg_file: &Path, result_file: &Path) -> ApplicationResult<()> {
        if self.fs.exists(result_file) {
            debug!("run: removing stale {}", result_file.display());
            self.fs
                .remove_file(result_file)
                .with_path_context("remove stale result file", result_file)?;
        }

        let program = self.program();
        let output = self
            .cmd
            .run_with_timeout(
                program,
                &[agg_file, result_file],
                self.settings.validator.timeout(),
            )
            .map_err(|e| {
                let message = match e.kind() {
                    io::ErrorKind::TimedOut => e.to_string(),
                    _ => format!("cannot run {}: {}", program.display(), e),
                };
                validator_error(message, None, String::new())
            })?;

        if !output.status.success() {
            let code = output.status.code();
            let message = match code {
                Some(code) => format!("{} exited with status {}", program.display(), code),
                None => format!("{} was terminated by a signal", program.display()),
            };
            return Err(validator_error(message, code, output.stderr));
        }

        if !self.fs.exists(result_file) {
            return Err(validator_error(
                format!(
                    "{} did not produce {}",
                    program.display(),
                    result_file.display()
                ),
                output.status.code(),
                output.stderr,
            ));
        }

        debug!("run: result written to {}", result_file.display());
        Ok(())
    }
}

fn validator_error(message: String, exit_code: Option<i32>, stderr: String) -> ApplicationError {
    let stderr = stderr.trim().to_string();
    let message = if stderr.is_empty() {
        message
    } else {
        format!("{message}: {stderr}")
    };
    ApplicationError::Validator {
        message,
        exit_code,
        stderr,
    }
}
