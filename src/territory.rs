//! Input data for a territory alignment run.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::traits::Id;

/// Prior brick-to-representative assignment. Bricks may be missing.
pub type Baseline<B, R> = HashMap<B, R>;

/// Uniform workload band applied to every representative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkloadBounds {
    /// Minimum total index value per representative (L).
    pub lower: f64,
    /// Maximum total index value per representative (U).
    pub upper: f64,
}

impl Default for WorkloadBounds {
    fn default() -> Self {
        Self {
            lower: 0.8,
            upper: 1.2,
        }
    }
}

impl WorkloadBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Inverted bounds are accepted here; the solver reports them as infeasible.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.lower.is_finite() && self.upper.is_finite() {
            Ok(())
        } else {
            Err(DataError::NonFiniteBounds {
                lower: self.lower,
                upper: self.upper,
            })
        }
    }

    pub fn contains(&self, workload: f64, tolerance: f64) -> bool {
        workload >= self.lower - tolerance && workload <= self.upper + tolerance
    }
}

/// Reason a balance band cannot be met by any assignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BalanceViolation {
    InvertedBounds { lower: f64, upper: f64 },
    InsufficientWorkload { total: f64, required: f64 },
    ExcessWorkload { total: f64, capacity: f64 },
}

impl fmt::Display for BalanceViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceViolation::InvertedBounds { lower, upper } => {
                write!(f, "lower bound {lower} exceeds upper bound {upper}")
            }
            BalanceViolation::InsufficientWorkload { total, required } => {
                write!(f, "total workload {total:.4} is below the required minimum {required:.4}")
            }
            BalanceViolation::ExcessWorkload { total, capacity } => {
                write!(f, "total workload {total:.4} exceeds the combined maximum {capacity:.4}")
            }
        }
    }
}

/// Bricks, representatives and the per-brick / per-pair data used by the models.
#[derive(Debug, Clone)]
pub struct Territory<B: Id, R: Id> {
    bricks: Vec<B>,
    reps: Vec<R>,
    index_values: HashMap<B, f64>,
    distances: HashMap<(B, R), f64>,
}

impl<B: Id, R: Id> Territory<B, R> {
    pub fn new(bricks: Vec<B>, reps: Vec<R>) -> Result<Self, DataError> {
        if bricks.is_empty() {
            return Err(DataError::NoBricks);
        }
        if reps.is_empty() {
            return Err(DataError::NoReps);
        }

        let mut seen = HashSet::with_capacity(bricks.len());
        for brick in &bricks {
            if !seen.insert(brick) {
                return Err(DataError::DuplicateBrick(brick.to_string()));
            }
        }
        let mut seen = HashSet::with_capacity(reps.len());
        for rep in &reps {
            if !seen.insert(rep) {
                return Err(DataError::DuplicateRep(rep.to_string()));
            }
        }

        Ok(Self {
            bricks,
            reps,
            index_values: HashMap::new(),
            distances: HashMap::new(),
        })
    }

    pub fn set_index_value(&mut self, brick: B, value: f64) {
        self.index_values.insert(brick, value);
    }

    pub fn set_distance(&mut self, brick: B, rep: R, distance: f64) {
        self.distances.insert((brick, rep), distance);
    }

    pub fn with_index_value(mut self, brick: B, value: f64) -> Self {
        self.set_index_value(brick, value);
        self
    }

    pub fn with_distance(mut self, brick: B, rep: R, distance: f64) -> Self {
        self.set_distance(brick, rep, distance);
        self
    }

    pub fn bricks(&self) -> &[B] {
        &self.bricks
    }

    pub fn reps(&self) -> &[R] {
        &self.reps
    }

    pub fn contains_brick(&self, brick: &B) -> bool {
        self.bricks.contains(brick)
    }

    pub fn contains_rep(&self, rep: &R) -> bool {
        self.reps.contains(rep)
    }

    pub fn index_value(&self, brick: &B) -> Option<f64> {
        self.index_values.get(brick).copied()
    }

    pub fn distance(&self, brick: &B, rep: &R) -> Option<f64> {
        self.distances.get(&(brick.clone(), rep.clone())).copied()
    }

    /// Index value of `brick`, failing if it is absent, non-finite or not positive.
    pub fn require_index_value(&self, brick: &B) -> Result<f64, DataError> {
        let value = self
            .index_value(brick)
            .ok_or_else(|| DataError::MissingIndexValue {
                brick: brick.to_string(),
            })?;
        if !value.is_finite() || value <= 0.0 {
            return Err(DataError::InvalidIndexValue {
                brick: brick.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// Distance for the pair, failing if it is absent, non-finite or negative.
    pub fn require_distance(&self, brick: &B, rep: &R) -> Result<f64, DataError> {
        let value = self
            .distance(brick, rep)
            .ok_or_else(|| DataError::MissingDistance {
                brick: brick.to_string(),
                rep: rep.to_string(),
            })?;
        if !value.is_finite() || value < 0.0 {
            return Err(DataError::InvalidDistance {
                brick: brick.to_string(),
                rep: rep.to_string(),
                value,
            });
        }
        Ok(value)
    }

    /// Index values in brick order.
    pub fn index_vector(&self) -> Result<Vec<f64>, DataError> {
        self.bricks
            .iter()
            .map(|brick| self.require_index_value(brick))
            .collect()
    }

    pub fn total_workload(&self) -> Result<f64, DataError> {
        Ok(self.index_vector()?.iter().sum())
    }

    /// Reports why no assignment can satisfy `bounds`, if the reason is
    /// visible from the totals alone.
    pub fn balance_violation(
        &self,
        bounds: &WorkloadBounds,
    ) -> Result<Option<BalanceViolation>, DataError> {
        if bounds.lower > bounds.upper {
            return Ok(Some(BalanceViolation::InvertedBounds {
                lower: bounds.lower,
                upper: bounds.upper,
            }));
        }

        let total = self.total_workload()?;
        let reps = self.reps.len() as f64;
        let required = bounds.lower * reps;
        let capacity = bounds.upper * reps;
        if total < required {
            return Ok(Some(BalanceViolation::InsufficientWorkload { total, required }));
        }
        if total > capacity {
            return Ok(Some(BalanceViolation::ExcessWorkload { total, capacity }));
        }
        Ok(None)
    }
}
