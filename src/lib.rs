//! Type constraint gathering.
//!
//! Facade over the workspace crates. The matcher, type model and lattice
//! live in [`tcg_solver`] and are re-exported here under [`solver`] and at
//! the crate root; string interning comes from [`tcg_common`].

pub use tcg_common::{Atom, ShardedInterner};

// Constraint-gathering subtype matcher
pub use tcg_solver as solver;
pub use tcg_solver::{
    Constraint, ConstraintKind, ConstraintMatcher, ConstraintObserver, ConstraintRecorder,
    CoreTypes, DeclarationResolver, DefId, DefKind, DefinitionError, DefinitionInfo,
    DefinitionStore, MatchSite, MergedConstraint, StandardTypeOps, TypeDatabase, TypeId,
    TypeInterner, TypeParamId, TypeSystemOps, Variance, is_subtype_of,
};

// Tracing configuration (text / tree / JSON output for debugging)
pub mod tracing_config;
