//! Constraint-gathering subtype matching.
//!
//! [`ConstraintMatcher::try_match`] decides whether `P` is a subtype of `Q`
//! where either side may mention inference variables the matcher tracks.
//! While deciding, it records lower and upper bounds on those variables in a
//! [`ConstraintLog`].
//!
//! ## Rule order
//!
//! Rules are tried in a fixed order; the first rule that applies and holds
//! wins, and a rule that applies but fails either falls through or decides
//! the whole match:
//!
//! | # | Condition | Outcome |
//! |---|-----------|---------|
//! | 1 | `P` is `_` | holds |
//! | 2 | `Q` is `_` | holds |
//! | 3 | `P` is a tracked variable | `Upper(P, Q)` |
//! | 4 | `Q` is a tracked variable | `Lower(Q, P)` |
//! | 5 | `P == Q` | holds |
//! | 6 | `Q` is `FutureOr<Q0>` | alternatives, see [`match_rules::unions`] |
//! | 7 | `Q` is `Q0?` | alternatives |
//! | 8 | `P` is `FutureOr<P0>` | `Future<P0> <: Q` and `P0 <: Q` |
//! | 9 | `P` is `P0?` | `P0 <: Q` and `Null <: Q` |
//! | 10 | `Q` is `dynamic`, `void` or `Object?` | holds |
//! | 11 | `P` is `Never` | holds |
//! | 12 | `Q` is `Object` | iff `P` is non-nullable |
//! | 13 | `P` is `Null` | iff `Q` is nullable |
//! | 14 | `P` is a bounded type parameter | bound `<: Q`, else fall through |
//! | 15 | both interface types | type arguments per variance |
//! | 16 | `Q` is `Function`, `P` a function | holds |
//! | 17 | both function types | [`match_rules::functions`] |
//! | 18 | `Q` is `Record`, `P` a record | holds |
//! | 19 | both record types | [`match_rules::records`] |
//! | 20 | otherwise | fails |
//!
//! ## Rewind integrity
//!
//! Every nested match takes a checkpoint on entry and rewinds to it when it
//! fails, so a failing `try_match` leaves the log exactly as it found it.
//!
//! ## Limits
//!
//! Nested matches are keyed `(P, Q, left_schema)`. A key that is already
//! pending is a cycle, and a walk that runs past its [`RecursionProfile`]
//! limits is cut off; both count as a failed match, never a panic. Each
//! top-level match is one walk with its own step budget. Within a walk,
//! keys that failed without hitting a cycle or a limit are remembered and
//! fail again at once, which keeps the alternatives of `FutureOr` and `T?`
//! from re-deciding the same pairs.
//!
//! [`match_rules::unions`]: crate::match_rules::unions
//! [`match_rules::functions`]: crate::match_rules::functions
//! [`match_rules::records`]: crate::match_rules::records

use crate::constraints::{
    Constraint, ConstraintLog, LogMark, MergedConstraint, merge_constraints,
};
use crate::ops::TypeSystemOps;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::trace::{ConstraintObserver, MatchSite};
use crate::types::{Nullability, TypeData, TypeId, TypeParamId};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

type MatchKey = (TypeId, TypeId, bool);

/// Remaining stack below which nested matching grows the stack.
const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each stack segment allocated on growth.
const STACK_GROWTH: usize = 1024 * 1024;

/// The rule that established a match. Reported in trace events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchRule {
    UnknownSubtype,
    UnknownSupertype,
    VariableSubtype,
    VariableSupertype,
    Identical,
    EventualSupertype,
    NullableSupertype,
    EventualSubtype,
    NullableSubtype,
    TopSupertype,
    NeverSubtype,
    ObjectSupertype,
    NullSubtype,
    TypeParameterBound,
    Interface,
    FunctionTop,
    Function,
    RecordTop,
    Record,
}

/// Gathers constraints on a fixed set of inference variables.
///
/// One matcher serves one inference problem: the driver calls
/// [`try_match`](Self::try_match) for every constraint site and then
/// [`compute_constraints`](Self::compute_constraints). The log is private,
/// so parallel inference uses one matcher per problem.
pub struct ConstraintMatcher<'a, O: TypeSystemOps + ?Sized> {
    ops: &'a O,
    variables: SmallVec<[TypeParamId; 4]>,
    log: ConstraintLog,
    guard: RecursionGuard<MatchKey>,
    /// Keys known to fail in the current walk.
    failed: FxHashSet<MatchKey>,
    /// Cycles and limits hit so far; a failure is only remembered when no
    /// refusal happened below it.
    refusals: u32,
    observer: Option<&'a mut dyn ConstraintObserver>,
}

impl<'a, O: TypeSystemOps + ?Sized> ConstraintMatcher<'a, O> {
    /// Create a matcher tracking `variables`, in that order.
    pub fn new(ops: &'a O, variables: impl IntoIterator<Item = TypeParamId>) -> Self {
        ConstraintMatcher {
            ops,
            variables: variables.into_iter().collect(),
            log: ConstraintLog::new(),
            guard: RecursionGuard::with_profile(RecursionProfile::ConstraintMatching),
            failed: FxHashSet::default(),
            refusals: 0,
            observer: None,
        }
    }

    /// Report constraints committed by [`try_match_at`](Self::try_match_at)
    /// to `observer`.
    pub fn with_observer(mut self, observer: &'a mut dyn ConstraintObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_recursion_profile(mut self, profile: RecursionProfile) -> Self {
        self.guard = RecursionGuard::with_profile(profile);
        self
    }

    pub fn ops(&self) -> &'a O {
        self.ops
    }

    pub fn variables(&self) -> &[TypeParamId] {
        &self.variables
    }

    pub fn is_tracked(&self, param: TypeParamId) -> bool {
        self.variables.contains(&param)
    }

    pub fn log(&self) -> &ConstraintLog {
        &self.log
    }

    pub fn constraints(&self) -> &[Constraint] {
        self.log.as_slice()
    }

    pub(crate) fn rewind_to(&mut self, mark: LogMark) {
        self.log.rewind(mark);
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Whether `p` is a subtype of `q`, recording the constraints that make
    /// it so.
    ///
    /// `left_schema` is true when `p` is the schema side (the side that may
    /// contain `_`); it chooses whose bounds fresh type parameters receive
    /// when generic function types are matched.
    pub fn try_match(&mut self, p: TypeId, q: TypeId, left_schema: bool) -> bool {
        let before = self.log.len();
        let matched = self.match_types(p, q, left_schema);
        debug!(
            p = %self.ops.format_type(p),
            q = %self.ops.format_type(q),
            left_schema,
            matched,
            added = self.log.len() - before,
            "try_match"
        );
        matched
    }

    /// [`try_match`](Self::try_match), reporting the constraints it committed
    /// to the observer under `site`.
    pub fn try_match_at(&mut self, site: MatchSite, p: TypeId, q: TypeId, left_schema: bool) -> bool {
        let mark = self.log.checkpoint();
        let matched = self.try_match(p, q, left_schema);
        if matched && let Some(observer) = self.observer.as_deref_mut() {
            observer.constraints_generated(site, self.log.since(mark));
        }
        matched
    }

    /// Constrain the variables so that an argument of type `argument` can be
    /// passed to a parameter of type `parameter`.
    pub fn constrain_argument(&mut self, argument: TypeId, parameter: TypeId) -> bool {
        self.try_match(argument, parameter, false)
    }

    /// Constrain the variables so that a call returning `declared_return` fits
    /// the context schema `context`.
    pub fn constrain_return_type(&mut self, declared_return: TypeId, context: TypeId) -> bool {
        self.try_match(declared_return, context, false)
    }

    /// Merge the log into one bound pair per tracked variable.
    ///
    /// Variables keep the order given to [`new`](Self::new). The log is left
    /// untouched, so this may be called again after further matching.
    pub fn compute_constraints(&self) -> IndexMap<TypeParamId, MergedConstraint> {
        let merged = merge_constraints(self.ops, &self.variables, &self.log);
        for (variable, constraint) in &merged {
            debug!(
                variable = variable.0,
                merged = %constraint.describe(self.ops),
                "compute_constraints"
            );
        }
        merged
    }

    // =========================================================================
    // Rule dispatch
    // =========================================================================

    /// Nested match: rewinds everything it added when it fails.
    pub(crate) fn match_types(&mut self, p: TypeId, q: TypeId, left_schema: bool) -> bool {
        if self.guard.depth() == 0 {
            self.guard.reset();
            self.failed.clear();
        }

        let key = (p, q, left_schema);
        if self.failed.contains(&key) {
            trace!(p = p.0, q = q.0, "match_types: known to fail");
            return false;
        }

        match self.guard.enter(key) {
            RecursionResult::Entered => {}
            refused => {
                self.refusals += 1;
                if refused.is_limit() {
                    warn!(
                        p = %self.ops.format_type(p),
                        q = %self.ops.format_type(q),
                        depth = self.guard.depth(),
                        steps = self.guard.steps(),
                        ?refused,
                        "match_types: limit reached, treated as no match"
                    );
                } else {
                    trace!(p = p.0, q = q.0, "match_types: cycle");
                }
                return false;
            }
        }

        let mark = self.log.checkpoint();
        let refusals = self.refusals;
        let rule = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            self.dispatch(p, q, left_schema)
        });
        self.guard.leave(key);

        match rule {
            Some(rule) => {
                trace!(p = p.0, q = q.0, ?rule, "match_types: holds");
                true
            }
            None => {
                self.log.rewind(mark);
                if self.refusals == refusals {
                    self.failed.insert(key);
                }
                trace!(p = p.0, q = q.0, "match_types: fails");
                false
            }
        }
    }

    fn dispatch(&mut self, p: TypeId, q: TypeId, left_schema: bool) -> Option<MatchRule> {
        let ops = self.ops;

        // 1, 2
        if p.is_unknown() {
            return Some(MatchRule::UnknownSubtype);
        }
        if q.is_unknown() {
            return Some(MatchRule::UnknownSupertype);
        }

        let p_data = ops.lookup(p)?;
        let q_data = ops.lookup(q)?;

        // 3, 4
        if let TypeData::TypeParameter(param, Nullability::NonNullable) = p_data
            && self.is_tracked(param)
        {
            self.log.add_upper(param, q);
            return Some(MatchRule::VariableSubtype);
        }
        if let TypeData::TypeParameter(param, Nullability::NonNullable) = q_data
            && self.is_tracked(param)
        {
            self.log.add_lower(param, p);
            return Some(MatchRule::VariableSupertype);
        }

        // 5
        if p == q {
            return Some(MatchRule::Identical);
        }

        // 6
        if let TypeData::Eventual(q0, Nullability::NonNullable) = q_data
            && self.match_eventual_supertype(p, q0, left_schema)
        {
            return Some(MatchRule::EventualSupertype);
        }

        // 7
        if q_data.nullability().is_nullable()
            && self.match_nullable_supertype(p, &p_data, q, left_schema)
        {
            return Some(MatchRule::NullableSupertype);
        }

        // 8
        if let TypeData::Eventual(p0, Nullability::NonNullable) = p_data {
            return self
                .match_eventual_subtype(p0, q, left_schema)
                .then_some(MatchRule::EventualSubtype);
        }

        // 9
        if p_data.nullability().is_nullable() {
            return self
                .match_nullable_subtype(p, q, left_schema)
                .then_some(MatchRule::NullableSubtype);
        }

        // 10, 11
        if ops.is_top_like(q) {
            return Some(MatchRule::TopSupertype);
        }
        if ops.is_bottom(p) {
            return Some(MatchRule::NeverSubtype);
        }

        // 12, 13
        if q == TypeId::OBJECT {
            return ops
                .is_known_non_nullable(p)
                .then_some(MatchRule::ObjectSupertype);
        }
        if p == TypeId::NULL {
            return ops.is_nullable(q).then_some(MatchRule::NullSubtype);
        }

        // 14; a nullable `X?` was already split by rule 9
        if let TypeData::TypeParameter(param, _) = p_data
            && let Some(bound) = ops.type_param_bound(param)
        {
            if self.match_types(bound, q, left_schema) {
                return Some(MatchRule::TypeParameterBound);
            }
        }

        match (&p_data, &q_data) {
            // 15
            (TypeData::Interface(p_def, p_args, _), TypeData::Interface(q_def, q_args, _)) => {
                let decls = ops.declarations();
                match (decls.kind(*p_def), decls.kind(*q_def)) {
                    (Some(p_kind), Some(q_kind)) if p_kind == q_kind => {
                        let p_args = ops.db().type_list(*p_args);
                        let q_args = ops.db().type_list(*q_args);
                        self.match_interfaces(*p_def, &p_args, *q_def, &q_args, left_schema)
                            .then_some(MatchRule::Interface)
                    }
                    _ => None,
                }
            }
            // 16, 17
            (TypeData::Function(_, _), TypeData::FunctionTop(Nullability::NonNullable)) => {
                Some(MatchRule::FunctionTop)
            }
            (TypeData::Function(_, _), TypeData::Function(_, _)) => self
                .match_function_types(p, q, left_schema)
                .then_some(MatchRule::Function),
            // 18, 19
            (TypeData::Record(_, _), TypeData::RecordTop(Nullability::NonNullable)) => {
                Some(MatchRule::RecordTop)
            }
            (TypeData::Record(_, _), TypeData::Record(_, _)) => self
                .match_record_types(p, q, left_schema)
                .then_some(MatchRule::Record),
            // 20
            _ => None,
        }
    }
}

/// Whether `a` is a subtype of `b`, with no inference variables involved.
pub fn is_subtype_of<O: TypeSystemOps + ?Sized>(ops: &O, a: TypeId, b: TypeId) -> bool {
    ConstraintMatcher::new(ops, std::iter::empty()).match_types(a, b, false)
}

#[cfg(test)]
#[path = "../tests/matcher_tests.rs"]
mod tests;
