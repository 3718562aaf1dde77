//! `good_lp` adapter for the solver contract.

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, default_solver,
    variable,
};
use tracing::{debug, info};

use crate::model::{Comparison, LinearExpr, MipModel, Sense, SolveStatus, SolverOutput};
use crate::traits::MipSolver;

/// Exact MIP solver backed by `good_lp`'s default (pure Rust) solver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoodLpSolver;

impl GoodLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl MipSolver for GoodLpSolver {
    fn solve(&self, model: &MipModel) -> SolverOutput {
        let mut vars = ProblemVariables::new();
        let handles: Vec<Variable> = model
            .variables()
            .map(|_| vars.add(variable().binary()))
            .collect();

        let objective = to_expression(&model.objective().expr, &handles);
        let unsolved = match model.objective().sense {
            Sense::Minimize => vars.minimise(objective),
            Sense::Maximize => vars.maximise(objective),
        };
        let mut problem = unsolved.using(default_solver);

        for row in model.constraints() {
            let lhs = to_expression(&row.expr, &handles);
            let constraint = match row.cmp {
                Comparison::Eq => lhs.eq(row.rhs),
                Comparison::Leq => lhs.leq(row.rhs),
                Comparison::Geq => lhs.geq(row.rhs),
            };
            problem = problem.with(constraint);
        }

        debug!(
            model = model.name(),
            variables = handles.len(),
            constraints = model.constraints().len(),
            "handing model to good_lp"
        );

        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = handles.iter().map(|var| solution.value(*var)).collect();
                let objective = model.objective().expr.evaluate(&values);
                info!(model = model.name(), objective, "solver reported optimal solution");
                SolverOutput::optimal(objective, values)
            }
            Err(ResolutionError::Infeasible) => {
                SolverOutput::without_solution(SolveStatus::Infeasible)
            }
            Err(ResolutionError::Unbounded) => {
                SolverOutput::without_solution(SolveStatus::Unbounded)
            }
            Err(other) => SolverOutput::without_solution(SolveStatus::Other(other.to_string())),
        }
    }
}

fn to_expression(expr: &LinearExpr, handles: &[Variable]) -> Expression {
    let mut out = Expression::with_capacity(expr.terms().len());
    for (var, coefficient) in expr.terms() {
        out.add_mul(*coefficient, handles[var.index()]);
    }
    out
}
