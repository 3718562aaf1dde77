//! Solver-agnostic description of a 0/1 integer program.
//!
//! Builders emit a [`MipModel`]; backends consume it and answer with a
//! [`SolverOutput`]. Every decision variable is binary.

use std::fmt;

/// Handle to a decision variable, dense and in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A linear combination of variables. Constants live on the constraint side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            terms: Vec::with_capacity(capacity),
        }
    }

    /// Adds `coefficient * var`. Zero coefficients are kept so that every
    /// (brick, rep) pair stays visible in the model.
    pub fn add_term(&mut self, coefficient: f64, var: VarId) {
        self.terms.push((var, coefficient));
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn coefficient_of(&self, var: VarId) -> f64 {
        self.terms
            .iter()
            .filter(|(v, _)| *v == var)
            .map(|(_, c)| *c)
            .sum()
    }

    /// Evaluates the expression against values indexed by [`VarId`].
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coefficient)| coefficient * values.get(var.0).copied().unwrap_or(0.0))
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Leq,
    Geq,
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Eq => f.write_str("="),
            Comparison::Leq => f.write_str("<="),
            Comparison::Geq => f.write_str(">="),
        }
    }
}

/// Tag identifying which constraint generator produced a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintFamily {
    AssignEachBrick,
    MinWorkload,
    MaxWorkload,
    Disruption,
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstraintFamily::AssignEachBrick => "AssignEachBrick",
            ConstraintFamily::MinWorkload => "MinWorkload",
            ConstraintFamily::MaxWorkload => "MaxWorkload",
            ConstraintFamily::Disruption => "Disruption",
        };
        f.write_str(name)
    }
}

/// `expr <cmp> rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub family: ConstraintFamily,
    pub name: String,
    pub expr: LinearExpr,
    pub cmp: Comparison,
    pub rhs: f64,
}

impl Constraint {
    /// Whether `values` satisfy this row within `tolerance`.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(values);
        match self.cmp {
            Comparison::Eq => (lhs - self.rhs).abs() <= tolerance,
            Comparison::Leq => lhs <= self.rhs + tolerance,
            Comparison::Geq => lhs >= self.rhs - tolerance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: Sense,
    pub expr: LinearExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MipModel {
    name: String,
    variables: Vec<String>,
    constraints: Vec<Constraint>,
    objective: Objective,
}

impl MipModel {
    pub fn new(name: impl Into<String>, sense: Sense) -> Self {
        Self {
            name: name.into(),
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: Objective {
                sense,
                expr: LinearExpr::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declares a new binary variable.
    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(name.into());
        id
    }

    pub fn add_constraint(
        &mut self,
        family: ConstraintFamily,
        name: impl Into<String>,
        expr: LinearExpr,
        cmp: Comparison,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            family,
            name: name.into(),
            expr,
            cmp,
            rhs,
        });
    }

    pub fn set_objective(&mut self, expr: LinearExpr) {
        self.objective.expr = expr;
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_name(&self, var: VarId) -> Option<&str> {
        self.variables.get(var.0).map(String::as_str)
    }

    pub fn variables(&self) -> impl Iterator<Item = (VarId, &str)> + '_ {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, name)| (VarId(i), name.as_str()))
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraints_in(
        &self,
        family: ConstraintFamily,
    ) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Names of the rows violated by `values`.
    pub fn violated_constraints(&self, values: &[f64], tolerance: f64) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(values, tolerance))
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Solver verdict.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    Optimal,
    /// A feasible incumbent whose optimality was not proven (time limit, gap).
    Feasible,
    Infeasible,
    Unbounded,
    Other(String),
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => f.write_str("OPTIMAL"),
            SolveStatus::Feasible => f.write_str("FEASIBLE"),
            SolveStatus::Infeasible => f.write_str("INFEASIBLE"),
            SolveStatus::Unbounded => f.write_str("UNBOUNDED"),
            SolveStatus::Other(reason) => write!(f, "OTHER ({reason})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolverOutput {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    pub values: Option<Vec<f64>>,
}

impl SolverOutput {
    pub fn optimal(objective_value: f64, values: Vec<f64>) -> Self {
        Self {
            status: SolveStatus::Optimal,
            objective_value: Some(objective_value),
            values: Some(values),
        }
    }

    pub fn feasible(objective_value: f64, values: Vec<f64>) -> Self {
        Self {
            status: SolveStatus::Feasible,
            objective_value: Some(objective_value),
            values: Some(values),
        }
    }

    pub fn without_solution(status: SolveStatus) -> Self {
        Self {
            status,
            objective_value: None,
            values: None,
        }
    }

    pub fn value(&self, var: VarId) -> Option<f64> {
        self.values.as_ref().and_then(|values| values.get(var.0).copied())
    }
}
