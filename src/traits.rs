//! Core domain traits for the territory planner.
//!
//! These are intentionally minimal. Concrete apps pick their own brick and
//! representative identifiers and their own solver backend.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::model::{MipModel, SolverOutput};

/// Unique identifier for bricks and representatives.
pub trait Id: Clone + Eq + Hash + Debug + Display {}

impl<T> Id for T where T: Clone + Eq + Hash + Debug + Display {}

/// An exact 0/1 integer program solver.
///
/// Implementations receive a complete model description and report a status,
/// plus variable values when a solution is available. Variable values are
/// indexed by [`crate::model::VarId`] in declaration order.
pub trait MipSolver {
    fn solve(&self, model: &MipModel) -> SolverOutput;
}

impl<S: MipSolver + ?Sized> MipSolver for &S {
    fn solve(&self, model: &MipModel) -> SolverOutput {
        (**self).solve(model)
    }
}
