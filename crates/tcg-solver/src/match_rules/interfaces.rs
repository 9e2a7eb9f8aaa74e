//! Interface types (rule 15).
//!
//! `C<M0, ..., Mn> <: D<N0, ..., Nk>` holds when `C` is `D` or derives from
//! it. For a subclass, `P` is first viewed as an instance of `D` by walking
//! the immediate supertypes of `C` with `P`'s arguments substituted, then
//! the arguments are compared as for the same declaration:
//!
//! - covariant parameter: `Mi <: Ni`
//! - contravariant parameter: `Ni <: Mi`
//! - invariant parameter: both
//! - unrelated parameter: skipped

use crate::def::DefId;
use crate::matcher::ConstraintMatcher;
use crate::ops::TypeSystemOps;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::TypeId;
use std::sync::Arc;
use tracing::{trace, warn};

impl<O: TypeSystemOps + ?Sized> ConstraintMatcher<'_, O> {
    /// Rule 15. Both sides are non-nullable interface types whose
    /// declarations have the same kind.
    pub(crate) fn match_interfaces(
        &mut self,
        p_def: DefId,
        p_args: &[TypeId],
        q_def: DefId,
        q_args: &[TypeId],
        left_schema: bool,
    ) -> bool {
        if p_def == q_def {
            return self.match_type_arguments(q_def, p_args, q_args, left_schema);
        }

        match as_instance_of(self.ops(), p_def, p_args, q_def) {
            Some(instance_args) => {
                trace!(
                    from = p_def.0,
                    to = q_def.0,
                    "match_interfaces: matched through superinterface"
                );
                self.match_type_arguments(q_def, &instance_args, q_args, left_schema)
            }
            None => false,
        }
    }

    /// Compare the arguments of two instantiations of `def` per the declared
    /// variance of each parameter. All or nothing.
    fn match_type_arguments(
        &mut self,
        def: DefId,
        p_args: &[TypeId],
        q_args: &[TypeId],
        left_schema: bool,
    ) -> bool {
        debug_assert_eq!(
            p_args.len(),
            q_args.len(),
            "instantiations of declaration #{} disagree on arity",
            def.0
        );

        let decls = self.ops().declarations();
        let mark = self.log().checkpoint();
        for (index, (&m, &n)) in p_args.iter().zip(q_args).enumerate() {
            let variance = decls.variance(def, index);
            if variance.requires_forward() && !self.match_types(m, n, left_schema) {
                self.rewind_to(mark);
                return false;
            }
            if variance.requires_backward() && !self.match_types(n, m, !left_schema) {
                self.rewind_to(mark);
                return false;
            }
        }
        true
    }
}

/// View `def<args>` as an instance of `target`.
///
/// Walks immediate supertypes transitively and returns the arguments of
/// the `target` instantiation reached. `None` when `def` does not derive
/// from `target`. A cyclic supertype graph, or one deeper than the supertype
/// traversal limit, is cut off where the walk is refused.
pub fn as_instance_of<O: TypeSystemOps + ?Sized>(
    ops: &O,
    def: DefId,
    args: &[TypeId],
    target: DefId,
) -> Option<Arc<[TypeId]>> {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::SupertypeTraversal);
    guard
        .scope(def, |guard| find_instance(ops, guard, def, args, target))
        .unwrap_or_else(|refused| {
            warn!(def = def.0, ?refused, "as_instance_of: superinterface search refused");
            None
        })
}

fn find_instance<O: TypeSystemOps + ?Sized>(
    ops: &O,
    guard: &mut RecursionGuard<DefId>,
    def: DefId,
    args: &[TypeId],
    target: DefId,
) -> Option<Arc<[TypeId]>> {
    let mut found: Option<Arc<[TypeId]>> = None;

    for supertype in ops.declarations().supertypes(ops.db(), def, args) {
        let Some((super_def, super_args, _)) = ops.interface_parts(supertype) else {
            continue;
        };

        let candidate = if super_def == target {
            Some(super_args)
        } else {
            guard
                .scope(super_def, |guard| {
                    find_instance(ops, guard, super_def, &super_args, target)
                })
                .unwrap_or_else(|refused| {
                    warn!(
                        def = super_def.0,
                        ?refused,
                        "as_instance_of: superinterface search refused"
                    );
                    None
                })
        };

        if let Some(candidate) = candidate {
            match &found {
                None => found = Some(candidate),
                Some(previous) => assert!(
                    previous == &candidate,
                    "declaration #{} reaches #{} with conflicting type arguments",
                    def.0,
                    target.0
                ),
            }
        }
    }
    found
}
