//! Territory planner orchestration.
//!
//! Each phase builds its model, hands it to a [`MipSolver`], extracts the
//! assignment and checks the workload band on the extracted result.

use tracing::{debug, info, info_span, warn};

use crate::builder::{
    AssignmentModel, build_disruption_model, build_distance_model, unbaselined_bricks,
};
use crate::error::PlanError;
use crate::extract::{Assignment, ExtractionPolicy, extract_assignment};
use crate::model::SolveStatus;
use crate::territory::{Baseline, Territory, WorkloadBounds};
use crate::traits::{Id, MipSolver};

/// Tolerance used when re-checking extracted workloads against the bounds.
const WORKLOAD_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Workload band applied to every representative.
    pub bounds: WorkloadBounds,
    /// Accept feasible but unproven solutions instead of failing.
    pub accept_feasible: bool,
    /// Handling of bricks with several selected representatives.
    pub extraction: ExtractionPolicy,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            bounds: WorkloadBounds::default(),
            accept_feasible: false,
            extraction: ExtractionPolicy::Strict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    MinimizeDistance,
    MinimizeDisruption,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::MinimizeDistance => "distance minimization",
            Phase::MinimizeDisruption => "disruption minimization",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optimality {
    Proven,
    NotProven,
}

#[derive(Debug, Clone)]
pub struct PhaseResult<B: Id, R: Id> {
    pub phase: Phase,
    pub objective_value: f64,
    pub optimality: Optimality,
    pub assignment: Assignment<B, R>,
    /// Total index value per representative, in territory rep order.
    pub workloads: Vec<(R, f64)>,
    /// Total distance of the assignment, when every pair has a distance.
    pub total_distance: Option<f64>,
    /// Workload-weighted disruption against the baseline (disruption phase only).
    pub disruption: Option<f64>,
    /// Bricks the baseline did not cover (disruption phase only).
    pub unbaselined: Vec<B>,
}

/// Outcome of both phases. A failed phase does not stop the other one.
#[derive(Debug)]
pub struct PlannerResult<B: Id, R: Id> {
    pub distance: Result<PhaseResult<B, R>, PlanError>,
    pub disruption: Result<PhaseResult<B, R>, PlanError>,
}

pub fn minimize_distance<B, R, S>(
    territory: &Territory<B, R>,
    solver: &S,
    options: &SolveOptions,
) -> Result<PhaseResult<B, R>, PlanError>
where
    B: Id,
    R: Id,
    S: MipSolver + ?Sized,
{
    let span = info_span!("phase", phase = Phase::MinimizeDistance.label());
    let _enter = span.enter();

    let built = build_distance_model(territory, &options.bounds)?;
    let mut result = solve_phase(Phase::MinimizeDistance, territory, built, solver, options)?;
    result.total_distance = total_distance(territory, &result.assignment);
    Ok(result)
}

pub fn minimize_disruption<B, R, S>(
    territory: &Territory<B, R>,
    baseline: &Baseline<B, R>,
    solver: &S,
    options: &SolveOptions,
) -> Result<PhaseResult<B, R>, PlanError>
where
    B: Id,
    R: Id,
    S: MipSolver + ?Sized,
{
    let span = info_span!("phase", phase = Phase::MinimizeDisruption.label());
    let _enter = span.enter();

    let built = build_disruption_model(territory, &options.bounds, baseline)?;
    let mut result = solve_phase(Phase::MinimizeDisruption, territory, built, solver, options)?;
    result.total_distance = total_distance(territory, &result.assignment);
    result.disruption = Some(disruption_cost(territory, baseline, &result.assignment)?);
    result.unbaselined = unbaselined_bricks(territory, baseline);
    Ok(result)
}

/// Runs distance minimization, then disruption minimization against `baseline`.
pub fn plan_both<B, R, S>(
    territory: &Territory<B, R>,
    baseline: &Baseline<B, R>,
    solver: &S,
    options: &SolveOptions,
) -> PlannerResult<B, R>
where
    B: Id,
    R: Id,
    S: MipSolver + ?Sized,
{
    let distance = minimize_distance(territory, solver, options);
    if let Err(err) = &distance {
        warn!(error = %err, "distance minimization failed; running disruption minimization");
    }
    let disruption = minimize_disruption(territory, baseline, solver, options);
    if let Err(err) = &disruption {
        warn!(error = %err, "disruption minimization failed");
    }
    PlannerResult { distance, disruption }
}

fn solve_phase<B, R, S>(
    phase: Phase,
    territory: &Territory<B, R>,
    built: AssignmentModel,
    solver: &S,
    options: &SolveOptions,
) -> Result<PhaseResult<B, R>, PlanError>
where
    B: Id,
    R: Id,
    S: MipSolver + ?Sized,
{
    let model_name = built.model.name().to_string();
    let diagnosis = territory.balance_violation(&options.bounds)?;
    if let Some(violation) = &diagnosis {
        warn!(
            model = %model_name,
            %violation,
            "workload bounds cannot be met; expecting infeasibility"
        );
    }

    let output = solver.solve(&built.model);
    debug!(model = %model_name, status = %output.status, "solver returned");

    let optimality = match output.status {
        SolveStatus::Optimal => Optimality::Proven,
        SolveStatus::Feasible if options.accept_feasible => {
            warn!(model = %model_name, "accepting a feasible solution that is not proven optimal");
            Optimality::NotProven
        }
        SolveStatus::Feasible => {
            return Err(PlanError::NotProvenOptimal {
                model: model_name,
                objective: output.objective_value.unwrap_or(f64::NAN),
            });
        }
        SolveStatus::Infeasible => {
            return Err(PlanError::Infeasible {
                model: model_name,
                diagnosis,
            });
        }
        SolveStatus::Unbounded => return Err(PlanError::Unbounded { model: model_name }),
        SolveStatus::Other(message) => {
            return Err(PlanError::SolverFailure {
                model: model_name,
                message,
            });
        }
    };

    let values = output
        .values
        .as_deref()
        .filter(|values| values.len() == built.model.variable_count())
        .ok_or_else(|| PlanError::MissingSolution {
            model: model_name.clone(),
        })?;
    let objective_value = output
        .objective_value
        .unwrap_or_else(|| built.model.objective().expr.evaluate(values));

    let assignment = extract_assignment(territory, &built.assign, values, options.extraction)?;
    let workloads = workloads(territory, &assignment)?;
    for (rep, workload) in &workloads {
        if !options.bounds.contains(*workload, WORKLOAD_TOLERANCE) {
            return Err(PlanError::WorkloadOutOfBounds {
                rep: rep.to_string(),
                workload: *workload,
                lower: options.bounds.lower,
                upper: options.bounds.upper,
            });
        }
    }

    info!(
        model = %model_name,
        objective = objective_value,
        bricks = assignment.len(),
        "phase solved"
    );

    Ok(PhaseResult {
        phase,
        objective_value,
        optimality,
        assignment,
        workloads,
        total_distance: None,
        disruption: None,
        unbaselined: Vec::new(),
    })
}

/// Total index value assigned to each representative, in territory rep order.
pub fn workloads<B: Id, R: Id>(
    territory: &Territory<B, R>,
    assignment: &Assignment<B, R>,
) -> Result<Vec<(R, f64)>, PlanError> {
    let mut totals: Vec<(R, f64)> = territory.reps().iter().map(|rep| (rep.clone(), 0.0)).collect();
    for (brick, rep) in assignment.iter() {
        let index_value = territory.require_index_value(brick)?;
        if let Some(slot) = totals.iter_mut().find(|(r, _)| r == rep) {
            slot.1 += index_value;
        }
    }
    Ok(totals)
}

/// Sum of distances for the assignment, or `None` if a pair has no distance.
pub fn total_distance<B: Id, R: Id>(
    territory: &Territory<B, R>,
    assignment: &Assignment<B, R>,
) -> Option<f64> {
    assignment
        .iter()
        .map(|(brick, rep)| territory.distance(brick, rep))
        .sum()
}

/// Workload-weighted count of bricks whose representative differs from the baseline.
///
/// Bricks without a baseline entry count as moved.
pub fn disruption_cost<B: Id, R: Id>(
    territory: &Territory<B, R>,
    baseline: &Baseline<B, R>,
    assignment: &Assignment<B, R>,
) -> Result<f64, PlanError> {
    let mut cost = 0.0;
    for (brick, rep) in assignment.iter() {
        if baseline.get(brick) != Some(rep) {
            cost += territory.require_index_value(brick)?;
        }
    }
    Ok(cost)
}
