//! Application-level errors (wraps domain errors)

use std::fmt;
use thiserror::Error;

use crate::domain::DomainError;

/// Pipeline stage a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Reading,
    Aggregating,
    Writing,
    Invoking,
    Reconstructing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Reading => "reading",
            Stage::Aggregating => "aggregating",
            Stage::Writing => "writing",
            Stage::Invoking => "invoking",
            Stage::Reconstructing => "reconstructing",
        };
        f.write_str(name)
    }
}

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("config error: {message}")]
    Config { message: String },

    #[error("validator failed: {message}")]
    Validator {
        message: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{context}: {source}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("{stage}: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<ApplicationError>,
    },
}

impl ApplicationError {
    /// Tag this error with the stage it happened in.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ ApplicationError::Stage { .. } => already,
            other => ApplicationError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The error beneath any stage tag.
    pub fn root(&self) -> &ApplicationError {
        match self {
            ApplicationError::Stage { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            ApplicationError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
