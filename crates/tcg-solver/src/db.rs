//! Type database abstraction for the solver.
//!
//! This trait isolates solver logic from concrete storage so the matcher
//! and the lattice never reach into the interner's internals directly.

use crate::def::DefId;
use crate::intern::{SyntheticParams, TypeInterner};
use crate::types::{
    FunctionShape, FunctionShapeId, Nullability, RecordShape, RecordShapeId, TypeData, TypeId,
    TypeListId, TypeParamId, TypeParamInfo,
};
use std::sync::Arc;
use tcg_common::interner::Atom;

/// Storage interface for types.
pub trait TypeDatabase {
    fn intern(&self, key: TypeData) -> TypeId;
    fn lookup(&self, id: TypeId) -> Option<TypeData>;
    fn intern_string(&self, s: &str) -> Atom;
    fn resolve_atom(&self, atom: Atom) -> String;
    fn resolve_atom_ref(&self, atom: Atom) -> Arc<str>;
    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]>;
    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape>;
    fn record_shape(&self, id: RecordShapeId) -> Arc<RecordShape>;

    fn type_param_info(&self, id: TypeParamId) -> TypeParamInfo;
    fn fresh_type_param(&self, name: Atom, bound: Option<TypeId>) -> TypeParamId;
    fn set_type_param_bound(&self, id: TypeParamId, bound: Option<TypeId>);
    fn synthetic_type_params(
        &self,
        key: SyntheticParams,
        make: &mut dyn FnMut() -> Vec<TypeParamId>,
    ) -> Arc<[TypeParamId]>;

    fn interface(&self, def: DefId, args: Vec<TypeId>) -> TypeId;
    fn type_param(&self, param: TypeParamId) -> TypeId;
    fn eventual(&self, inner: TypeId) -> TypeId;
    fn function(&self, shape: FunctionShape) -> TypeId;
    fn record(&self, shape: RecordShape) -> TypeId;
    fn with_nullability(&self, ty: TypeId, nullability: Nullability) -> TypeId;
}

impl TypeDatabase for TypeInterner {
    fn intern(&self, key: TypeData) -> TypeId {
        TypeInterner::intern(self, key)
    }

    fn lookup(&self, id: TypeId) -> Option<TypeData> {
        TypeInterner::lookup(self, id)
    }

    fn intern_string(&self, s: &str) -> Atom {
        TypeInterner::intern_string(self, s)
    }

    fn resolve_atom(&self, atom: Atom) -> String {
        TypeInterner::resolve_atom(self, atom)
    }

    fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        TypeInterner::resolve_atom_ref(self, atom)
    }

    fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        TypeInterner::type_list(self, id)
    }

    fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        TypeInterner::function_shape(self, id)
    }

    fn record_shape(&self, id: RecordShapeId) -> Arc<RecordShape> {
        TypeInterner::record_shape(self, id)
    }

    fn type_param_info(&self, id: TypeParamId) -> TypeParamInfo {
        TypeInterner::type_param_info(self, id)
    }

    fn fresh_type_param(&self, name: Atom, bound: Option<TypeId>) -> TypeParamId {
        TypeInterner::fresh_type_param(self, name, bound)
    }

    fn set_type_param_bound(&self, id: TypeParamId, bound: Option<TypeId>) {
        TypeInterner::set_type_param_bound(self, id, bound);
    }

    fn synthetic_type_params(
        &self,
        key: SyntheticParams,
        make: &mut dyn FnMut() -> Vec<TypeParamId>,
    ) -> Arc<[TypeParamId]> {
        TypeInterner::synthetic_type_params(self, key, make)
    }

    fn interface(&self, def: DefId, args: Vec<TypeId>) -> TypeId {
        TypeInterner::interface(self, def, args)
    }

    fn type_param(&self, param: TypeParamId) -> TypeId {
        TypeInterner::type_param(self, param)
    }

    fn eventual(&self, inner: TypeId) -> TypeId {
        TypeInterner::eventual(self, inner)
    }

    fn function(&self, shape: FunctionShape) -> TypeId {
        TypeInterner::function(self, shape)
    }

    fn record(&self, shape: RecordShape) -> TypeId {
        TypeInterner::record(self, shape)
    }

    fn with_nullability(&self, ty: TypeId, nullability: Nullability) -> TypeId {
        TypeInterner::with_nullability(self, ty, nullability)
    }
}
