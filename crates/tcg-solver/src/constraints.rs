//! The constraint log.
//!
//! Matching appends single-direction bounds on inference variables to a log
//! with stack discipline: a checkpoint is the current length and rewinding
//! truncates back to it. Failed alternatives are undone this way without
//! touching constraints committed before the checkpoint.

use crate::ops::TypeSystemOps;
use crate::types::{TypeId, TypeParamId};
use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;
use tracing::trace;

/// Direction of a bound.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ConstraintKind {
    /// The variable must be a supertype of the bound.
    Lower,
    /// The variable must be a subtype of the bound.
    Upper,
}

/// A single recorded bound on an inference variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Constraint {
    pub variable: TypeParamId,
    pub bound: TypeId,
    pub kind: ConstraintKind,
}

impl Constraint {
    pub const fn lower(variable: TypeParamId, bound: TypeId) -> Self {
        Constraint {
            variable,
            bound,
            kind: ConstraintKind::Lower,
        }
    }

    pub const fn upper(variable: TypeParamId, bound: TypeId) -> Self {
        Constraint {
            variable,
            bound,
            kind: ConstraintKind::Upper,
        }
    }
}

/// A position in the log returned by [`ConstraintLog::checkpoint`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct LogMark(usize);

impl LogMark {
    pub const fn len(self) -> usize {
        self.0
    }
}

/// Append-only constraint log with checkpoint/rewind.
#[derive(Clone, Debug, Default)]
pub struct ConstraintLog {
    entries: SmallVec<[Constraint; 8]>,
}

impl ConstraintLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_lower(&mut self, variable: TypeParamId, bound: TypeId) {
        self.push(Constraint::lower(variable, bound));
    }

    pub fn add_upper(&mut self, variable: TypeParamId, bound: TypeId) {
        self.push(Constraint::upper(variable, bound));
    }

    pub fn push(&mut self, constraint: Constraint) {
        trace!(
            variable = constraint.variable.0,
            bound = constraint.bound.0,
            kind = ?constraint.kind,
            "ConstraintLog::push"
        );
        self.entries.push(constraint);
    }

    #[inline]
    pub fn checkpoint(&self) -> LogMark {
        LogMark(self.entries.len())
    }

    /// Discard every constraint appended since `mark` was taken.
    #[inline]
    pub fn rewind(&mut self, mark: LogMark) {
        debug_assert!(
            mark.0 <= self.entries.len(),
            "rewind to mark {} past the end of a log of length {}",
            mark.0,
            self.entries.len()
        );
        self.entries.truncate(mark.0);
    }

    /// Constraints appended since `mark`.
    pub fn since(&self, mark: LogMark) -> &[Constraint] {
        &self.entries[mark.0.min(self.entries.len())..]
    }

    /// Whether anything was appended since `mark`.
    #[inline]
    pub fn grew_since(&self, mark: LogMark) -> bool {
        self.entries.len() > mark.0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn as_slice(&self) -> &[Constraint] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.entries.iter()
    }
}

/// The merged bounds of one inference variable.
///
/// `lower` is the join of every lower bound and `upper` the meet of every
/// upper bound. A variable with no bound in a direction keeps `Unknown`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MergedConstraint {
    pub lower: TypeId,
    pub upper: TypeId,
}

impl Default for MergedConstraint {
    fn default() -> Self {
        MergedConstraint {
            lower: TypeId::UNKNOWN,
            upper: TypeId::UNKNOWN,
        }
    }
}

impl MergedConstraint {
    /// `lower <: X <: upper` rendered with the given operations.
    pub fn describe<O: TypeSystemOps + ?Sized>(&self, ops: &O) -> String {
        format!(
            "{} <: X <: {}",
            ops.format_type(self.lower),
            ops.format_type(self.upper)
        )
    }
}

/// Fold the log into one merged bound pair per variable.
///
/// The result lists `variables` in the given order. Constraints on variables
/// outside `variables` are ignored.
pub fn merge_constraints<O: TypeSystemOps + ?Sized>(
    ops: &O,
    variables: &[TypeParamId],
    log: &ConstraintLog,
) -> IndexMap<TypeParamId, MergedConstraint> {
    let mut merged: IndexMap<TypeParamId, MergedConstraint> = variables
        .iter()
        .map(|&variable| (variable, MergedConstraint::default()))
        .collect();

    for constraint in log.iter() {
        let Some(entry) = merged.get_mut(&constraint.variable) else {
            continue;
        };
        match constraint.kind {
            ConstraintKind::Lower => entry.lower = ops.join(entry.lower, constraint.bound),
            ConstraintKind::Upper => entry.upper = ops.meet(entry.upper, constraint.bound),
        }
    }
    merged
}

#[cfg(test)]
#[path = "../tests/constraints_tests.rs"]
mod tests;
