//! Printable per-phase reports.

use std::fmt;

use serde::Serialize;

use crate::error::PlanError;
use crate::solver::{Optimality, Phase, PhaseResult};
use crate::traits::Id;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentRow {
    pub brick: String,
    pub representative: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadRow {
    pub representative: String,
    pub workload: f64,
}

/// Id-independent view of a [`PhaseResult`], renderable as text or JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseReport {
    pub phase: String,
    pub objective: f64,
    pub proven_optimal: bool,
    pub assignments: Vec<AssignmentRow>,
    pub workloads: Vec<WorkloadRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disruption: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unbaselined: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tie_breaks: Vec<String>,
}

impl<B: Id, R: Id> From<&PhaseResult<B, R>> for PhaseReport {
    fn from(result: &PhaseResult<B, R>) -> Self {
        Self {
            phase: result.phase.label().to_string(),
            objective: result.objective_value,
            proven_optimal: result.optimality == Optimality::Proven,
            assignments: result
                .assignment
                .iter()
                .map(|(brick, rep)| AssignmentRow {
                    brick: brick.to_string(),
                    representative: rep.to_string(),
                })
                .collect(),
            workloads: result
                .workloads
                .iter()
                .map(|(rep, workload)| WorkloadRow {
                    representative: rep.to_string(),
                    workload: *workload,
                })
                .collect(),
            total_distance: result.total_distance,
            disruption: result.disruption,
            unbaselined: result.unbaselined.iter().map(ToString::to_string).collect(),
            tie_breaks: result
                .assignment
                .tie_breaks()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl fmt::Display for PhaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.proven_optimal {
            "Optimal solution"
        } else {
            "Feasible solution (optimality not proven)"
        };
        writeln!(f, "{} for {}: {:.4}", label, self.phase, self.objective)?;

        let brick_width = self
            .assignments
            .iter()
            .map(|row| row.brick.len())
            .chain(std::iter::once("Brick".len()))
            .max()
            .unwrap_or(0);
        writeln!(f, "{:>brick_width$}  Representative", "Brick")?;
        for row in &self.assignments {
            writeln!(f, "{:>brick_width$}  {:>14}", row.brick, row.representative)?;
        }

        writeln!(f)?;
        writeln!(f, "Workload per representative:")?;
        for row in &self.workloads {
            writeln!(f, "  {:>6}  {:.4}", row.representative, row.workload)?;
        }
        if let Some(distance) = self.total_distance {
            writeln!(f, "Total distance: {distance:.2}")?;
        }
        if let Some(disruption) = self.disruption {
            writeln!(f, "Disruption: {disruption:.4}")?;
        }
        if !self.unbaselined.is_empty() {
            writeln!(f, "Bricks without baseline: {}", self.unbaselined.join(", "))?;
        }
        if !self.tie_breaks.is_empty() {
            writeln!(f, "Tie-broken bricks: {}", self.tie_breaks.join(", "))?;
        }
        Ok(())
    }
}

/// One phase of a run: its report, or the error that stopped it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PhaseOutcome {
    Solved(PhaseReport),
    Failed { phase: String, error: String },
}

impl PhaseOutcome {
    pub fn new<B: Id, R: Id>(phase: Phase, result: &Result<PhaseResult<B, R>, PlanError>) -> Self {
        match result {
            Ok(result) => PhaseOutcome::Solved(PhaseReport::from(result)),
            Err(err) => PhaseOutcome::Failed {
                phase: phase.label().to_string(),
                error: err.to_string(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, PhaseOutcome::Failed { .. })
    }
}

impl fmt::Display for PhaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseOutcome::Solved(report) => fmt::Display::fmt(report, f),
            PhaseOutcome::Failed { phase, error } => {
                writeln!(f, "No solution for {phase}: {error}")
            }
        }
    }
}
