//! Join and meet.
//!
//! Used to fold the bounds of one inference variable into a single pair:
//! lower bounds are joined, upper bounds are met. `_` is the identity of
//! both operations, so an unconstrained direction stays `_`.
//!
//! Subtyping here is the matcher run with no tracked variables.

use crate::matcher::is_subtype_of;
use crate::ops::TypeSystemOps;
use crate::recursion::{RecursionGuard, RecursionProfile};
use crate::types::{Nullability, NamedField, RecordShape, TypeData, TypeId};
use rustc_hash::FxHashMap;
use tracing::warn;

/// Least upper bound of `a` and `b`.
pub fn join<O: TypeSystemOps + ?Sized>(ops: &O, a: TypeId, b: TypeId) -> TypeId {
    if a == b || b.is_unknown() {
        return a;
    }
    if a.is_unknown() {
        return b;
    }

    for top in [TypeId::DYNAMIC, TypeId::VOID, TypeId::OBJECT_NULLABLE] {
        if a == top || b == top {
            return top;
        }
    }
    if ops.is_bottom(a) {
        return b;
    }
    if ops.is_bottom(b) {
        return a;
    }
    if a == TypeId::NULL {
        return make_nullable(ops, b);
    }
    if b == TypeId::NULL {
        return make_nullable(ops, a);
    }

    if ops.nullability(a).is_nullable() || ops.nullability(b).is_nullable() {
        let inner = join(ops, ops.non_nullable(a), ops.non_nullable(b));
        return make_nullable(ops, inner);
    }

    if is_subtype_of(ops, a, b) {
        return b;
    }
    if is_subtype_of(ops, b, a) {
        return a;
    }

    let fallback = if ops.is_known_non_nullable(a) && ops.is_known_non_nullable(b) {
        TypeId::OBJECT
    } else {
        TypeId::OBJECT_NULLABLE
    };

    match (ops.lookup(a), ops.lookup(b)) {
        (Some(TypeData::Interface(..)), Some(TypeData::Interface(..))) => {
            shared_superinterface(ops, a, b).unwrap_or(fallback)
        }
        (
            Some(TypeData::Function(..) | TypeData::FunctionTop(_)),
            Some(TypeData::Function(..) | TypeData::FunctionTop(_)),
        ) => TypeId::FUNCTION,
        (Some(TypeData::Record(..)), Some(TypeData::Record(..))) => {
            join_records(ops, a, b).unwrap_or(TypeId::RECORD)
        }
        (
            Some(TypeData::Record(..) | TypeData::RecordTop(_)),
            Some(TypeData::Record(..) | TypeData::RecordTop(_)),
        ) => TypeId::RECORD,
        _ => fallback,
    }
}

/// Greatest lower bound of `a` and `b`.
pub fn meet<O: TypeSystemOps + ?Sized>(ops: &O, a: TypeId, b: TypeId) -> TypeId {
    if a == b || b.is_unknown() {
        return a;
    }
    if a.is_unknown() {
        return b;
    }

    if ops.is_top_like(a) && ops.is_top_like(b) {
        return if top_rank(a) <= top_rank(b) { a } else { b };
    }
    if ops.is_top_like(a) {
        return b;
    }
    if ops.is_top_like(b) {
        return a;
    }
    if ops.is_bottom(a) || ops.is_bottom(b) {
        return TypeId::NEVER;
    }

    if is_subtype_of(ops, a, b) {
        return a;
    }
    if is_subtype_of(ops, b, a) {
        return b;
    }

    if ops.nullability(a).is_nullable() && ops.nullability(b).is_nullable() {
        let inner = meet(ops, ops.non_nullable(a), ops.non_nullable(b));
        return make_nullable(ops, inner);
    }
    TypeId::NEVER
}

/// `Object?` below `void` below `dynamic`.
fn top_rank(ty: TypeId) -> u8 {
    match ty {
        TypeId::OBJECT_NULLABLE => 0,
        TypeId::VOID => 1,
        _ => 2,
    }
}

fn make_nullable<O: TypeSystemOps + ?Sized>(ops: &O, ty: TypeId) -> TypeId {
    if ops.is_nullable(ty) {
        ty
    } else {
        ops.with_nullability(ty, Nullability::Nullable)
    }
}

/// Fieldwise join of two records with the same shape.
fn join_records<O: TypeSystemOps + ?Sized>(ops: &O, a: TypeId, b: TypeId) -> Option<TypeId> {
    let (a_shape, _) = ops.record_shape(a)?;
    let (b_shape, _) = ops.record_shape(b)?;
    if a_shape.positional.len() != b_shape.positional.len()
        || a_shape.named.len() != b_shape.named.len()
        || a_shape
            .named
            .iter()
            .zip(&b_shape.named)
            .any(|(x, y)| x.name != y.name)
    {
        return None;
    }

    let shape = RecordShape {
        positional: a_shape
            .positional
            .iter()
            .zip(&b_shape.positional)
            .map(|(&x, &y)| join(ops, x, y))
            .collect(),
        named: a_shape
            .named
            .iter()
            .zip(&b_shape.named)
            .map(|(x, y)| NamedField {
                name: x.name,
                type_id: join(ops, x.type_id, y.type_id),
            })
            .collect(),
    };
    Some(ops.db().record(shape))
}

/// The unique shared superinterface of greatest depth.
///
/// Depth is the length of the longest supertype path up to a root
/// declaration. When several shared candidates have the same depth, that
/// depth is ambiguous and the search moves to shallower candidates.
fn shared_superinterface<O: TypeSystemOps + ?Sized>(
    ops: &O,
    a: TypeId,
    b: TypeId,
) -> Option<TypeId> {
    let mut guard = RecursionGuard::with_profile(RecursionProfile::SupertypeTraversal);
    let mut a_supers = FxHashMap::default();
    let mut b_supers = FxHashMap::default();
    collect_superinterfaces(ops, a, &mut a_supers, &mut guard);
    collect_superinterfaces(ops, b, &mut b_supers, &mut guard);

    let mut by_depth: FxHashMap<u32, Vec<TypeId>> = FxHashMap::default();
    for (&ty, &depth) in &a_supers {
        if b_supers.contains_key(&ty) {
            by_depth.entry(depth).or_default().push(ty);
        }
    }

    let mut depths: Vec<u32> = by_depth.keys().copied().collect();
    depths.sort_unstable_by(|x, y| y.cmp(x));
    depths
        .into_iter()
        .find_map(|depth| match by_depth[&depth].as_slice() {
            [single] => Some(*single),
            _ => None,
        })
}

/// Record `ty` and all its superinterfaces with their depths. Returns the
/// depth of `ty`.
fn collect_superinterfaces<O: TypeSystemOps + ?Sized>(
    ops: &O,
    ty: TypeId,
    out: &mut FxHashMap<TypeId, u32>,
    guard: &mut RecursionGuard<TypeId>,
) -> u32 {
    if let Some(&depth) = out.get(&ty) {
        return depth;
    }
    let Some((def, args, _)) = ops.interface_parts(ty) else {
        return 0;
    };

    let mut depth = 1;
    for supertype in ops.declarations().supertypes(ops.db(), def, &args) {
        let super_depth = guard
            .scope(supertype, |guard| collect_superinterfaces(ops, supertype, out, guard))
            .unwrap_or_else(|refused| {
                warn!(
                    supertype = %ops.format_type(supertype),
                    ?refused,
                    "collect_superinterfaces: walk refused"
                );
                0
            });
        depth = depth.max(super_depth + 1);
    }
    out.insert(ty, depth);
    depth
}

#[cfg(test)]
#[path = "../tests/lattice_tests.rs"]
mod tests;
