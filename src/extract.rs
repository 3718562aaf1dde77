//! Turns solved `x[b,r]` values into a brick-to-representative assignment.

use std::collections::HashMap;

use tracing::warn;

use crate::builder::VarGrid;
use crate::error::PlanError;
use crate::territory::Territory;
use crate::traits::Id;

/// A value above this counts as "assigned".
pub const SELECTION_THRESHOLD: f64 = 0.5;

/// How to treat bricks with more than one selected representative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionPolicy {
    /// Any inconsistency is an error.
    #[default]
    Strict,
    /// Keep the strictly largest value and record the brick as tie-broken.
    TieBreak,
}

/// Every brick mapped to exactly one representative, in territory order.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment<B: Id, R: Id> {
    entries: Vec<(B, R)>,
    lookup: HashMap<B, usize>,
    tie_breaks: Vec<B>,
}

impl<B: Id, R: Id> Assignment<B, R> {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (B, R)>) -> Self {
        let entries: Vec<(B, R)> = pairs.into_iter().collect();
        let lookup = entries
            .iter()
            .enumerate()
            .map(|(i, (brick, _))| (brick.clone(), i))
            .collect();
        Self {
            entries,
            lookup,
            tie_breaks: Vec::new(),
        }
    }

    pub fn rep_of(&self, brick: &B) -> Option<&R> {
        self.lookup.get(brick).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&B, &R)> + '_ {
        self.entries.iter().map(|(brick, rep)| (brick, rep))
    }

    pub fn bricks_of<'a>(&'a self, rep: &'a R) -> impl Iterator<Item = &'a B> + 'a {
        self.entries
            .iter()
            .filter(move |(_, r)| r == rep)
            .map(|(brick, _)| brick)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bricks whose representative was picked by [`ExtractionPolicy::TieBreak`].
    pub fn tie_breaks(&self) -> &[B] {
        &self.tie_breaks
    }
}

/// Picks, for every brick, the representative whose value exceeds
/// [`SELECTION_THRESHOLD`].
pub fn extract_assignment<B: Id, R: Id>(
    territory: &Territory<B, R>,
    assign: &VarGrid,
    values: &[f64],
    policy: ExtractionPolicy,
) -> Result<Assignment<B, R>, PlanError> {
    let mut pairs = Vec::with_capacity(territory.bricks().len());
    let mut tie_breaks = Vec::new();

    for (b, brick) in territory.bricks().iter().enumerate() {
        let selected: Vec<(usize, f64)> = assign
            .row(b)
            .iter()
            .enumerate()
            .map(|(r, var)| (r, values.get(var.index()).copied().unwrap_or(0.0)))
            .filter(|(_, value)| *value > SELECTION_THRESHOLD)
            .collect();

        let rep_index = match (selected.as_slice(), policy) {
            ([(r, _)], _) => *r,
            ([], _) | (_, ExtractionPolicy::Strict) => {
                return Err(PlanError::AmbiguousExtraction {
                    brick: brick.to_string(),
                    selected: selected.len(),
                });
            }
            (candidates, ExtractionPolicy::TieBreak) => {
                let r = strictly_largest(candidates).ok_or_else(|| PlanError::AmbiguousExtraction {
                    brick: brick.to_string(),
                    selected: candidates.len(),
                })?;
                warn!(
                    brick = %brick,
                    candidates = candidates.len(),
                    rep = %territory.reps()[r],
                    "several representatives above threshold; kept the largest value"
                );
                tie_breaks.push(brick.clone());
                r
            }
        };

        pairs.push((brick.clone(), territory.reps()[rep_index].clone()));
    }

    let mut assignment = Assignment::from_pairs(pairs);
    assignment.tie_breaks = tie_breaks;
    Ok(assignment)
}

fn strictly_largest(candidates: &[(usize, f64)]) -> Option<usize> {
    let (best, best_value) = candidates
        .iter()
        .copied()
        .max_by(|a, b| a.1.total_cmp(&b.1))?;
    let tied = candidates.iter().filter(|(_, value)| *value == best_value).count();
    (tied == 1).then_some(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_distance_model;
    use crate::territory::WorkloadBounds;

    fn territory() -> Territory<u32, u32> {
        let mut territory = Territory::new(vec![1, 2], vec![7, 8]).unwrap();
        for brick in [1, 2] {
            territory.set_index_value(brick, 1.0);
            for rep in [7, 8] {
                territory.set_distance(brick, rep, 1.0);
            }
        }
        territory
    }

    fn grid(territory: &Territory<u32, u32>) -> VarGrid {
        build_distance_model(territory, &WorkloadBounds::default())
            .unwrap()
            .assign
    }

    #[test]
    fn test_extracts_one_rep_per_brick() {
        let territory = territory();
        let assign = grid(&territory);
        // x[1,7] x[1,8] x[2,7] x[2,8]
        let values = [0.0, 1.0, 0.999_999, 1e-7];

        let assignment =
            extract_assignment(&territory, &assign, &values, ExtractionPolicy::Strict).unwrap();
        assert_eq!(assignment.len(), 2);
        assert_eq!(assignment.rep_of(&1), Some(&8));
        assert_eq!(assignment.rep_of(&2), Some(&7));
        assert_eq!(assignment.bricks_of(&8).collect::<Vec<_>>(), vec![&1]);
        assert!(assignment.tie_breaks().is_empty());
    }

    #[test]
    fn test_no_selection_is_an_error() {
        let territory = territory();
        let assign = grid(&territory);
        let values = [0.4, 0.4, 1.0, 0.0];

        let err = extract_assignment(&territory, &assign, &values, ExtractionPolicy::TieBreak)
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::AmbiguousExtraction {
                brick: "1".to_string(),
                selected: 0
            }
        );
    }

    #[test]
    fn test_double_selection_strict() {
        let territory = territory();
        let assign = grid(&territory);
        let values = [1.0, 0.0, 0.6, 0.9];

        let err = extract_assignment(&territory, &assign, &values, ExtractionPolicy::Strict)
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::AmbiguousExtraction {
                brick: "2".to_string(),
                selected: 2
            }
        );
    }

    #[test]
    fn test_double_selection_tie_break_keeps_largest() {
        let territory = territory();
        let assign = grid(&territory);
        let values = [1.0, 0.0, 0.6, 0.9];

        let assignment =
            extract_assignment(&territory, &assign, &values, ExtractionPolicy::TieBreak).unwrap();
        assert_eq!(assignment.rep_of(&2), Some(&8));
        assert_eq!(assignment.tie_breaks(), &[2]);
    }

    #[test]
    fn test_exact_tie_is_still_an_error() {
        let territory = territory();
        let assign = grid(&territory);
        let values = [0.8, 0.8, 1.0, 0.0];

        let outcome = extract_assignment(&territory, &assign, &values, ExtractionPolicy::TieBreak);
        assert!(outcome.is_err());
    }
}
