//! Type substitution.
//!
//! Replaces type parameter references with concrete types. Used to map a
//! declaration's supertypes onto the arguments of an instantiation and to
//! put fresh parameters into generic function types while matching them.

use crate::db::TypeDatabase;
use crate::intern::SyntheticParams;
use crate::types::{
    FunctionShape, NamedField, NamedParamInfo, ParamInfo, RecordShape, TypeData, TypeId,
    TypeParamId,
};
use rustc_hash::FxHashMap;

/// A mapping from type parameters to the types replacing them.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeParamId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair `params` with `args` positionally. Missing arguments leave the
    /// parameter unsubstituted.
    pub fn from_args(params: &[TypeParamId], args: &[TypeId]) -> Self {
        let map = params
            .iter()
            .zip(args.iter())
            .map(|(&param, &arg)| (param, arg))
            .collect();
        Self { map }
    }

    pub fn insert(&mut self, param: TypeParamId, replacement: TypeId) {
        self.map.insert(param, replacement);
    }

    pub fn get(&self, param: TypeParamId) -> Option<TypeId> {
        self.map.get(&param).copied()
    }

    pub fn contains(&self, param: TypeParamId) -> bool {
        self.map.contains_key(&param)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Apply `subst` to `ty`.
///
/// A nullable reference `T?` becomes the replacement made nullable.
pub fn instantiate_type(db: &dyn TypeDatabase, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
    if subst.is_empty() || ty.is_intrinsic() {
        return ty;
    }
    let Some(data) = db.lookup(ty) else {
        return ty;
    };

    match data {
        TypeData::TypeParameter(param, nullability) => match subst.get(param) {
            Some(replacement) if nullability.is_nullable() => {
                db.with_nullability(replacement, nullability)
            }
            Some(replacement) => replacement,
            None => ty,
        },
        TypeData::Interface(def, args, nullability) => {
            let args = db.type_list(args);
            let new_args: Vec<TypeId> = args
                .iter()
                .map(|&arg| instantiate_type(db, arg, subst))
                .collect();
            if new_args.as_slice() == &*args {
                return ty;
            }
            db.with_nullability(db.interface(def, new_args), nullability)
        }
        TypeData::Eventual(inner, nullability) => {
            let new_inner = instantiate_type(db, inner, subst);
            if new_inner == inner {
                return ty;
            }
            db.with_nullability(db.eventual(new_inner), nullability)
        }
        TypeData::Function(shape_id, nullability) => {
            let shape = db.function_shape(shape_id);
            let new_shape = instantiate_function_shape(db, &shape, subst);
            if new_shape == *shape {
                return ty;
            }
            db.with_nullability(db.function(new_shape), nullability)
        }
        TypeData::Record(shape_id, nullability) => {
            let shape = db.record_shape(shape_id);
            let new_shape = RecordShape {
                positional: shape
                    .positional
                    .iter()
                    .map(|&field| instantiate_type(db, field, subst))
                    .collect(),
                named: shape
                    .named
                    .iter()
                    .map(|field| NamedField {
                        name: field.name,
                        type_id: instantiate_type(db, field.type_id, subst),
                    })
                    .collect(),
            };
            if new_shape == *shape {
                return ty;
            }
            db.with_nullability(db.record(new_shape), nullability)
        }
        _ => ty,
    }
}

/// Apply `subst` to a function shape.
///
/// Type parameters of the shape that `subst` maps are instantiated and
/// disappear from the result. Remaining type parameters whose bounds would
/// change are replaced by fresh parameters carrying the substituted bounds,
/// so the input's own parameters keep their bounds. The replacements are
/// shared by every instantiation that produces the same bounds.
pub fn instantiate_function_shape(
    db: &dyn TypeDatabase,
    shape: &FunctionShape,
    subst: &TypeSubstitution,
) -> FunctionShape {
    if subst.is_empty() {
        return shape.clone();
    }

    let remaining: Vec<TypeParamId> = shape
        .type_params
        .iter()
        .copied()
        .filter(|&param| !subst.contains(param))
        .collect();

    let old_bounds: Vec<Option<TypeId>> = remaining
        .iter()
        .map(|&param| db.type_param_info(param).bound)
        .collect();
    let new_bounds: Vec<Option<TypeId>> = old_bounds
        .iter()
        .map(|bound| bound.map(|bound| instantiate_type(db, bound, subst)))
        .collect();

    let mut local = subst.clone();
    let type_params = if new_bounds != old_bounds {
        let key = SyntheticParams::Rebound {
            params: remaining.as_slice().into(),
            bounds: new_bounds.as_slice().into(),
        };
        let fresh = db.synthetic_type_params(key, &mut || {
            let fresh: Vec<TypeParamId> = remaining
                .iter()
                .map(|&param| db.fresh_type_param(db.type_param_info(param).name, None))
                .collect();
            let mut rename = TypeSubstitution::new();
            for (&old, &new) in remaining.iter().zip(&fresh) {
                rename.insert(old, db.type_param(new));
            }
            for (bound, &new) in new_bounds.iter().zip(&fresh) {
                let bound = bound.map(|bound| instantiate_type(db, bound, &rename));
                db.set_type_param_bound(new, bound);
            }
            fresh
        });
        for (&old, &new) in remaining.iter().zip(fresh.iter()) {
            local.insert(old, db.type_param(new));
        }
        fresh.to_vec()
    } else {
        remaining
    };

    FunctionShape {
        type_params,
        positional: shape
            .positional
            .iter()
            .map(|param| ParamInfo {
                type_id: instantiate_type(db, param.type_id, &local),
                required: param.required,
            })
            .collect(),
        named: shape
            .named
            .iter()
            .map(|param| NamedParamInfo {
                name: param.name,
                type_id: instantiate_type(db, param.type_id, &local),
                required: param.required,
            })
            .collect(),
        return_type: instantiate_type(db, shape.return_type, &local),
    }
}

#[cfg(test)]
#[path = "../tests/instantiate_tests.rs"]
mod tests;
