//! Function types (rule 17).
//!
//! Return types are compared covariantly and parameters contravariantly:
//! the subtype must accept every call the supertype accepts. Parameters are
//! compared with the schema side flipped since `P` and `Q` trade places.
//!
//! Generic function types need the same number of type parameters with
//! mutually matching bounds. Both sides are then instantiated with one fresh,
//! untracked type parameter per position whose bound comes from the schema
//! side, and the instantiated signatures are compared. The fresh parameters
//! belong to the pair of function types, so matching the same pair again
//! reuses them. Constraints that mention the fresh parameters are kept as
//! they are; eliminating them from the recorded bounds is not done.

use crate::instantiate::{TypeSubstitution, instantiate_function_shape};
use crate::intern::SyntheticParams;
use crate::matcher::ConstraintMatcher;
use crate::ops::TypeSystemOps;
use crate::types::{FunctionShape, NamedParamInfo, TypeId};
use std::cmp::Ordering;

impl<O: TypeSystemOps + ?Sized> ConstraintMatcher<'_, O> {
    /// Rule 17: both sides are function types.
    pub(crate) fn match_function_types(&mut self, p: TypeId, q: TypeId, left_schema: bool) -> bool {
        let ops = self.ops();
        let (Some((p_shape, p_nullability)), Some((q_shape, q_nullability))) =
            (ops.function_shape(p), ops.function_shape(q))
        else {
            return false;
        };
        if p_nullability.is_nullable() || q_nullability.is_nullable() {
            return false;
        }
        if p_shape.type_params.len() != q_shape.type_params.len() {
            return false;
        }

        let mark = self.log().checkpoint();
        let matched = if p_shape.is_generic() {
            let key = SyntheticParams::Comparison { p, q, left_schema };
            self.match_generic_signatures(key, &p_shape, &q_shape, left_schema)
        } else {
            self.match_signatures(&p_shape, &q_shape, left_schema)
        };
        if !matched {
            self.rewind_to(mark);
        }
        matched
    }

    fn match_generic_signatures(
        &mut self,
        key: SyntheticParams,
        p_shape: &FunctionShape,
        q_shape: &FunctionShape,
        left_schema: bool,
    ) -> bool {
        let ops = self.ops();
        let db = ops.db();
        let schema_shape = if left_schema { p_shape } else { q_shape };

        // Bounds may mention the parameters themselves (`T extends Comparable<T>`),
        // so both sides are compared in terms of the same fresh parameters,
        // which carry the schema side's bounds from the start.
        let fresh = db.synthetic_type_params(key, &mut || {
            let fresh: Vec<_> = schema_shape
                .type_params
                .iter()
                .map(|&param| ops.fresh_type_param(db.type_param_info(param).name, None))
                .collect();
            let mut rename = TypeSubstitution::new();
            for (&param, &replacement) in schema_shape.type_params.iter().zip(&fresh) {
                rename.insert(param, db.type_param(replacement));
            }
            for (&param, &replacement) in schema_shape.type_params.iter().zip(&fresh) {
                let bound = ops
                    .type_param_bound(param)
                    .map(|bound| ops.instantiate(bound, &rename))
                    .filter(|&bound| bound != TypeId::OBJECT_NULLABLE);
                db.set_type_param_bound(replacement, bound);
            }
            fresh
        });

        let mut p_subst = TypeSubstitution::new();
        let mut q_subst = TypeSubstitution::new();
        for ((&p_param, &q_param), &param) in
            p_shape.type_params.iter().zip(&q_shape.type_params).zip(fresh.iter())
        {
            let reference = db.type_param(param);
            p_subst.insert(p_param, reference);
            q_subst.insert(q_param, reference);
        }

        for (&p_param, &q_param) in p_shape.type_params.iter().zip(&q_shape.type_params) {
            let p_bound = ops.instantiate(
                ops.type_param_bound(p_param).unwrap_or(TypeId::OBJECT_NULLABLE),
                &p_subst,
            );
            let q_bound = ops.instantiate(
                ops.type_param_bound(q_param).unwrap_or(TypeId::OBJECT_NULLABLE),
                &q_subst,
            );
            if !self.match_types(p_bound, q_bound, left_schema)
                || !self.match_types(q_bound, p_bound, !left_schema)
            {
                return false;
            }
        }

        let p_instance = instantiate_function_shape(db, p_shape, &p_subst);
        let q_instance = instantiate_function_shape(db, q_shape, &q_subst);
        self.match_signatures(&p_instance, &q_instance, left_schema)
    }

    /// Compare two non-generic signatures. The caller rewinds on failure.
    fn match_signatures(&mut self, p: &FunctionShape, q: &FunctionShape, left_schema: bool) -> bool {
        if !self.match_types(p.return_type, q.return_type, left_schema) {
            return false;
        }

        // P must accept at least Q's positional arguments and require no more.
        if p.required_positional_count() > q.required_positional_count()
            || p.positional.len() < q.positional.len()
        {
            return false;
        }
        for (q_param, p_param) in q.positional.iter().zip(&p.positional) {
            if !self.match_types(q_param.type_id, p_param.type_id, !left_schema) {
                return false;
            }
        }

        self.match_named_parameters(&p.named, &q.named, left_schema)
    }

    /// Merge the name-sorted named parameter lists of both sides.
    fn match_named_parameters(
        &mut self,
        p_named: &[NamedParamInfo],
        q_named: &[NamedParamInfo],
        left_schema: bool,
    ) -> bool {
        let db = self.ops().db();
        debug_assert!(
            p_named
                .windows(2)
                .all(|w| db.resolve_atom_ref(w[0].name) < db.resolve_atom_ref(w[1].name)),
            "named parameters are not sorted by name"
        );
        debug_assert!(
            q_named
                .windows(2)
                .all(|w| db.resolve_atom_ref(w[0].name) < db.resolve_atom_ref(w[1].name)),
            "named parameters are not sorted by name"
        );

        let (mut pi, mut qi) = (0, 0);
        loop {
            match (p_named.get(pi), q_named.get(qi)) {
                (None, None) => return true,
                // Q passes a name P does not accept.
                (None, Some(_)) => return false,
                (Some(p_param), None) => {
                    if p_param.required {
                        return false;
                    }
                    pi += 1;
                }
                (Some(p_param), Some(q_param)) => {
                    let order = if p_param.name == q_param.name {
                        Ordering::Equal
                    } else {
                        db.resolve_atom_ref(p_param.name)
                            .cmp(&db.resolve_atom_ref(q_param.name))
                    };
                    match order {
                        Ordering::Less => {
                            if p_param.required {
                                return false;
                            }
                            pi += 1;
                        }
                        Ordering::Greater => return false,
                        Ordering::Equal => {
                            if p_param.required && !q_param.required {
                                return false;
                            }
                            if !self.match_types(q_param.type_id, p_param.type_id, !left_schema) {
                                return false;
                            }
                            pi += 1;
                            qi += 1;
                        }
                    }
                }
            }
        }
    }
}
