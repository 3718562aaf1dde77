//! Model builders for the two planning phases.
//!
//! Both phases share the feasible region: one representative per brick and
//! every representative's workload inside the [`WorkloadBounds`] band. They
//! differ in objective, and the disruption phase adds one indicator per
//! (brick, rep) pair.

use tracing::{debug, warn};

use crate::error::DataError;
use crate::model::{Comparison, ConstraintFamily, LinearExpr, MipModel, Sense, VarId};
use crate::territory::{Baseline, Territory, WorkloadBounds};
use crate::traits::Id;

pub const DISTANCE_MODEL: &str = "Minimize_Distance";
pub const DISRUPTION_MODEL: &str = "Minimize_Disruption";

/// Variables indexed by (brick position, rep position).
#[derive(Debug, Clone, PartialEq)]
pub struct VarGrid {
    reps: usize,
    vars: Vec<VarId>,
}

impl VarGrid {
    fn declare<B: Id, R: Id>(
        model: &mut MipModel,
        prefix: &str,
        territory: &Territory<B, R>,
    ) -> Self {
        let reps = territory.reps().len();
        let mut vars = Vec::with_capacity(territory.bricks().len() * reps);
        for brick in territory.bricks() {
            for rep in territory.reps() {
                vars.push(model.add_binary(format!("{prefix}[{brick},{rep}]")));
            }
        }
        Self { reps, vars }
    }

    pub fn get(&self, brick: usize, rep: usize) -> VarId {
        self.vars[brick * self.reps + rep]
    }

    /// Variables of one brick, in rep order.
    pub fn row(&self, brick: usize) -> &[VarId] {
        &self.vars[brick * self.reps..(brick + 1) * self.reps]
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// A built model plus handles to its decision variables.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    pub model: MipModel,
    /// `x[b,r]`: brick b is assigned to rep r.
    pub assign: VarGrid,
    /// `y[b,r]`: brick b moved into rep r. Only present in the disruption model.
    pub disrupt: Option<VarGrid>,
}

/// Minimize `Σ distance[b,r] * x[b,r]` under the balance constraints.
pub fn build_distance_model<B: Id, R: Id>(
    territory: &Territory<B, R>,
    bounds: &WorkloadBounds,
) -> Result<AssignmentModel, DataError> {
    bounds.validate()?;
    let index_values = territory.index_vector()?;

    let mut model = MipModel::new(DISTANCE_MODEL, Sense::Minimize);
    let assign = VarGrid::declare(&mut model, "x", territory);

    let mut objective = LinearExpr::with_capacity(assign.len());
    for (b, brick) in territory.bricks().iter().enumerate() {
        for (r, rep) in territory.reps().iter().enumerate() {
            let distance = territory.require_distance(brick, rep)?;
            objective.add_term(distance, assign.get(b, r));
        }
    }
    model.set_objective(objective);

    add_feasible_region(&mut model, territory, &index_values, &assign, bounds);

    debug!(
        variables = model.variable_count(),
        constraints = model.constraints().len(),
        "built distance model"
    );

    Ok(AssignmentModel {
        model,
        assign,
        disrupt: None,
    })
}

/// Minimize `Σ index[b] * y[b,r]` where `y[b,r] >= x[b,r] - [baseline[b] == r]`.
pub fn build_disruption_model<B: Id, R: Id>(
    territory: &Territory<B, R>,
    bounds: &WorkloadBounds,
    baseline: &Baseline<B, R>,
) -> Result<AssignmentModel, DataError> {
    bounds.validate()?;
    check_baseline(territory, baseline)?;
    let index_values = territory.index_vector()?;

    let mut model = MipModel::new(DISRUPTION_MODEL, Sense::Minimize);
    let assign = VarGrid::declare(&mut model, "x", territory);
    let disrupt = VarGrid::declare(&mut model, "y", territory);

    let mut objective = LinearExpr::with_capacity(disrupt.len());
    for (b, index_value) in index_values.iter().enumerate() {
        for &y in disrupt.row(b) {
            objective.add_term(*index_value, y);
        }
    }
    model.set_objective(objective);

    add_feasible_region(&mut model, territory, &index_values, &assign, bounds);

    // y - x >= -prior
    for (b, brick) in territory.bricks().iter().enumerate() {
        let prior = baseline.get(brick);
        for (r, rep) in territory.reps().iter().enumerate() {
            let indicator = if prior == Some(rep) { 1.0 } else { 0.0 };
            let mut expr = LinearExpr::with_capacity(2);
            expr.add_term(1.0, disrupt.get(b, r));
            expr.add_term(-1.0, assign.get(b, r));
            model.add_constraint(
                ConstraintFamily::Disruption,
                format!("Disruption[{brick},{rep}]"),
                expr,
                Comparison::Geq,
                -indicator,
            );
        }
    }

    debug!(
        variables = model.variable_count(),
        constraints = model.constraints().len(),
        "built disruption model"
    );

    Ok(AssignmentModel {
        model,
        assign,
        disrupt: Some(disrupt),
    })
}

/// Bricks of the territory that have no baseline representative.
///
/// These are charged their full index value by the disruption objective.
pub fn unbaselined_bricks<B: Id, R: Id>(
    territory: &Territory<B, R>,
    baseline: &Baseline<B, R>,
) -> Vec<B> {
    territory
        .bricks()
        .iter()
        .filter(|brick| !baseline.contains_key(*brick))
        .cloned()
        .collect()
}

fn check_baseline<B: Id, R: Id>(
    territory: &Territory<B, R>,
    baseline: &Baseline<B, R>,
) -> Result<(), DataError> {
    for brick in territory.bricks() {
        if let Some(rep) = baseline.get(brick) {
            if !territory.contains_rep(rep) {
                return Err(DataError::UnknownBaselineRep {
                    brick: brick.to_string(),
                    rep: rep.to_string(),
                });
            }
        }
    }

    let unknown = baseline
        .keys()
        .filter(|brick| !territory.contains_brick(brick))
        .count();
    if unknown > 0 {
        warn!(unknown, "baseline lists bricks outside the territory; ignoring them");
    }

    let missing = unbaselined_bricks(territory, baseline);
    if !missing.is_empty() {
        let listed = missing.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
        warn!(
            bricks = %listed,
            "bricks without a baseline representative are charged their full index value"
        );
    }
    Ok(())
}

fn add_feasible_region<B: Id, R: Id>(
    model: &mut MipModel,
    territory: &Territory<B, R>,
    index_values: &[f64],
    assign: &VarGrid,
    bounds: &WorkloadBounds,
) {
    for (b, brick) in territory.bricks().iter().enumerate() {
        let mut expr = LinearExpr::with_capacity(territory.reps().len());
        for &x in assign.row(b) {
            expr.add_term(1.0, x);
        }
        model.add_constraint(
            ConstraintFamily::AssignEachBrick,
            format!("AssignEachBrick[{brick}]"),
            expr,
            Comparison::Eq,
            1.0,
        );
    }

    for (r, rep) in territory.reps().iter().enumerate() {
        let mut workload = LinearExpr::with_capacity(index_values.len());
        for (b, index_value) in index_values.iter().enumerate() {
            workload.add_term(*index_value, assign.get(b, r));
        }
        model.add_constraint(
            ConstraintFamily::MinWorkload,
            format!("MinWorkload[{rep}]"),
            workload.clone(),
            Comparison::Geq,
            bounds.lower,
        );
        model.add_constraint(
            ConstraintFamily::MaxWorkload,
            format!("MaxWorkload[{rep}]"),
            workload,
            Comparison::Leq,
            bounds.upper,
        );
    }
}
