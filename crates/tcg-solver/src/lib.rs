//! Constraint-Gathering Subtype Matcher
//!
//! This crate infers type arguments for generic functions, methods and
//! constructors. Given a type `P` and a schema `Q` that mentions inference
//! variables, [`ConstraintMatcher`] decides whether `P` is a subtype of `Q`
//! and records the lower and upper bounds that make it so. The bounds of
//! each variable are then merged into one pair for a downstream solver.
//!
//! - **Interned types**: `TypeId` equality is structural equality
//! - **Backtracking**: alternatives are undone by rewinding a constraint log
//! - **Pluggable type system**: every classification query goes through
//!   [`TypeSystemOps`] and [`DeclarationResolver`]
//!
//! ```ignore
//! let interner = TypeInterner::new();
//! let defs = DefinitionStore::new();
//! let ops = StandardTypeOps::new(&interner, &defs, CoreTypes::register(&interner, &defs));
//!
//! let mut matcher = ConstraintMatcher::new(&ops, [t]);
//! matcher.constrain_argument(list_of_string, iterable_of_t);
//! let merged = matcher.compute_constraints();
//! ```
mod constraints;
mod core_types;
mod db;
pub mod def;
mod format;
mod instantiate;
mod intern;
pub mod lattice;
mod match_rules;
mod matcher;
mod ops;
pub mod recursion;
mod trace;
pub mod types;
pub mod variance;

pub use constraints::{
    Constraint, ConstraintKind, ConstraintLog, LogMark, MergedConstraint, merge_constraints,
};
pub use core_types::CoreTypes;
pub use db::TypeDatabase;
pub use def::{DeclarationResolver, DefId, DefKind, DefinitionError, DefinitionInfo, DefinitionStore};
pub use format::TypeFormatter;
pub use instantiate::{TypeSubstitution, instantiate_function_shape, instantiate_type};
pub use intern::{SyntheticParams, TypeInterner};
pub use match_rules::interfaces::as_instance_of;
pub use matcher::{ConstraintMatcher, MatchRule, is_subtype_of};
pub use ops::{StandardTypeOps, TypeSystemOps};
pub use recursion::{RecursionGuard, RecursionProfile, RecursionResult};
pub use trace::{ConstraintObserver, ConstraintRecorder, MatchSite};
pub use types::*;
pub use variance::Variance;

#[cfg(test)]
#[path = "../tests/fixtures.rs"]
pub(crate) mod fixtures;
