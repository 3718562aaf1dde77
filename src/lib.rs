//! territory-planner core
//!
//! Balanced brick-to-representative assignment as 0/1 integer programs:
//! distance minimization, then disruption minimization against a baseline.

pub mod traits;
pub mod model;
pub mod territory;
pub mod builder;
pub mod extract;
pub mod solver;
pub mod lp;
pub mod loader;
pub mod report;
pub mod error;
