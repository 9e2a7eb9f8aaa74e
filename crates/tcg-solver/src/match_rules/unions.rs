//! Union-like types: `FutureOr<T>` and `T?`.
//!
//! Both are unions in disguise. `FutureOr<T>` is `T | Future<T>` and `T?`
//! is `T | Null`. On the right a union offers alternatives, tried in order
//! with a rewind between attempts. On the left every member has to match,
//! so the rules become conjunctions.
//!
//! An alternative that succeeds without recording anything is weaker than
//! one that constrains a variable: for `List<int> <: FutureOr<T>` the
//! `Future<T>` branch fails and `List<int> <: T` gives `T :> List<int>`,
//! whereas for `Future<int> <: FutureOr<T>` the `Future<T>` branch gives
//! `T :> int`. Branches that succeed vacuously are only accepted as a last
//! resort.

use crate::matcher::ConstraintMatcher;
use crate::ops::TypeSystemOps;
use crate::types::{Nullability, TypeData, TypeId};

impl<O: TypeSystemOps + ?Sized> ConstraintMatcher<'_, O> {
    /// Rule 6: `P <: FutureOr<Q0>`.
    pub(crate) fn match_eventual_supertype(
        &mut self,
        p: TypeId,
        q0: TypeId,
        left_schema: bool,
    ) -> bool {
        let ops = self.ops();
        let mark = self.log().checkpoint();

        // (a) FutureOr<P0> <: FutureOr<Q0> if P0 <: Q0
        if let Some((p0, Nullability::NonNullable)) = ops.eventual_inner(p)
            && self.match_types(p0, q0, left_schema)
        {
            return true;
        }

        // (b) P <: Future<Q0>, if it constrains something
        let future_q0 = ops.future_type(q0);
        let future_matched = self.match_types(p, future_q0, left_schema);
        if future_matched && self.log().grew_since(mark) {
            return true;
        }
        // Nothing was recorded, so rewinding only clears the way for (c).
        self.rewind_to(mark);

        // (c) P <: Q0
        if self.match_types(p, q0, left_schema) {
            return true;
        }

        // (d) the vacuous success of (b); the log is already as (b) left it
        future_matched
    }

    /// Rule 7: `P <: Q0?`.
    pub(crate) fn match_nullable_supertype(
        &mut self,
        p: TypeId,
        p_data: &TypeData,
        q: TypeId,
        left_schema: bool,
    ) -> bool {
        let ops = self.ops();
        let q0 = ops.non_nullable(q);
        let mark = self.log().checkpoint();

        // (a) P0? <: Q0? if P0 <: Q0
        if p_data.nullability().is_nullable()
            && self.match_types(ops.non_nullable(p), q0, left_schema)
        {
            return true;
        }

        // (b) dynamic and void behave as Object? here
        if ops.is_dynamic_or_void(p) && self.match_types(TypeId::OBJECT, q0, left_schema) {
            return true;
        }

        // (c) P <: Q0, if it constrains something
        let plain_matched = self.match_types(p, q0, left_schema);
        if plain_matched && self.log().grew_since(mark) {
            return true;
        }
        self.rewind_to(mark);

        // (d) P <: Null
        if self.match_types(p, TypeId::NULL, left_schema) {
            return true;
        }

        // (e) the vacuous success of (c)
        plain_matched
    }

    /// Rule 8: `FutureOr<P0> <: Q` iff `Future<P0> <: Q` and `P0 <: Q`.
    pub(crate) fn match_eventual_subtype(&mut self, p0: TypeId, q: TypeId, left_schema: bool) -> bool {
        let mark = self.log().checkpoint();
        let future_p0 = self.ops().future_type(p0);
        if self.match_types(future_p0, q, left_schema) && self.match_types(p0, q, left_schema) {
            return true;
        }
        self.rewind_to(mark);
        false
    }

    /// Rule 9: `P0? <: Q` iff `P0 <: Q` and `Null <: Q`.
    pub(crate) fn match_nullable_subtype(&mut self, p: TypeId, q: TypeId, left_schema: bool) -> bool {
        let mark = self.log().checkpoint();
        let p0 = self.ops().non_nullable(p);
        if self.match_types(p0, q, left_schema) && self.match_types(TypeId::NULL, q, left_schema) {
            return true;
        }
        self.rewind_to(mark);
        false
    }
}
