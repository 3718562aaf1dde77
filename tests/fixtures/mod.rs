//! Test fixtures for territory-planner.
//!
//! Provides the 22-brick, 4-representative reference territory and its
//! current assignment.

#![allow(dead_code)]

pub mod reference_territory;

pub use reference_territory::*;
