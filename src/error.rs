//! Error types.
//!
//! Keys are carried as their `Display` rendering so the errors stay
//! independent of the brick and representative id types.

use std::path::PathBuf;

use thiserror::Error;

use crate::territory::BalanceViolation;

/// Data-integrity failures in the input tables.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DataError {
    #[error("territory has no bricks")]
    NoBricks,
    #[error("territory has no representatives")]
    NoReps,
    #[error("brick {0} is listed more than once")]
    DuplicateBrick(String),
    #[error("representative {0} is listed more than once")]
    DuplicateRep(String),
    #[error("brick {brick} has no index value")]
    MissingIndexValue { brick: String },
    #[error("brick {brick} has invalid index value {value} (must be finite and positive)")]
    InvalidIndexValue { brick: String, value: f64 },
    #[error("no distance for brick {brick} and representative {rep}")]
    MissingDistance { brick: String, rep: String },
    #[error("invalid distance {value} for brick {brick} and rep {rep} (must be finite and >= 0)")]
    InvalidDistance { brick: String, rep: String, value: f64 },
    #[error("baseline assigns brick {brick} to unknown representative {rep}")]
    UnknownBaselineRep { brick: String, rep: String },
    #[error("workload bounds must be finite (got L={lower}, U={upper})")]
    NonFiniteBounds { lower: f64, upper: f64 },
}

/// Failures while building, solving or extracting one planning phase.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("model `{model}` is infeasible{}", diagnosis_suffix(.diagnosis))]
    Infeasible {
        model: String,
        diagnosis: Option<BalanceViolation>,
    },
    #[error("model `{model}` is unbounded")]
    Unbounded { model: String },
    #[error("solver failed on model `{model}`: {message}")]
    SolverFailure { model: String, message: String },
    #[error("model `{model}` found objective {objective} but did not prove it optimal")]
    NotProvenOptimal { model: String, objective: f64 },
    #[error("solver reported a solution for model `{model}` but returned no variable values")]
    MissingSolution { model: String },
    #[error("brick {brick} has {selected} representatives selected above the 0.5 threshold")]
    AmbiguousExtraction { brick: String, selected: usize },
    #[error("representative {rep} has workload {workload} outside [{lower}, {upper}]")]
    WorkloadOutOfBounds {
        rep: String,
        workload: f64,
        lower: f64,
        upper: f64,
    },
}

fn diagnosis_suffix(diagnosis: &Option<BalanceViolation>) -> String {
    match diagnosis {
        Some(violation) => format!(": {violation}"),
        None => String::new(),
    }
}

/// Failures while reading the input tables.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("distance table has no representative columns")]
    NoRepColumns,
    #[error("unexpected column `{0}` in distance table (expected `brick`, then `rpN`)")]
    UnexpectedColumn(String),
    #[error("row for brick {brick} has an unparsable value `{value}` in column `{column}`")]
    BadValue {
        brick: String,
        column: String,
        value: String,
    },
    #[error("brick {0} appears in the distance table but not in the index table")]
    UnindexedBrick(u32),
    #[error("brick {brick} has more than one row in the {table} table")]
    DuplicateRow { table: &'static str, brick: u32 },
    #[error(transparent)]
    Data(#[from] DataError),
}
