//! Type-system operations consumed by the matcher.
//!
//! The matcher is representation-agnostic: every classification query it
//! makes goes through [`TypeSystemOps`]. Implementors provide storage
//! (`db`), declarations, the `Future<T>` type used by `FutureOr`, and the
//! lattice operations used when merging constraints. The classification
//! predicates have default implementations over the database.

use crate::core_types::CoreTypes;
use crate::db::TypeDatabase;
use crate::def::{DeclarationResolver, DefId, DefinitionStore};
use crate::format::TypeFormatter;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::intern::TypeInterner;
use crate::lattice;
use crate::types::{
    FunctionShape, Nullability, RecordShape, TypeData, TypeId, TypeParamId,
};
use std::sync::Arc;
use tcg_common::interner::Atom;

/// Classification and lattice operations over a type representation.
pub trait TypeSystemOps {
    fn db(&self) -> &dyn TypeDatabase;

    fn declarations(&self) -> &dyn DeclarationResolver;

    /// `Future<inner>`, the asynchronous half of `FutureOr<inner>`.
    fn future_type(&self, inner: TypeId) -> TypeId;

    /// Least upper bound.
    fn join(&self, a: TypeId, b: TypeId) -> TypeId;

    /// Greatest lower bound.
    fn meet(&self, a: TypeId, b: TypeId) -> TypeId;

    // =========================================================================
    // Provided queries
    // =========================================================================

    fn lookup(&self, ty: TypeId) -> Option<TypeData> {
        self.db().lookup(ty)
    }

    fn nullability(&self, ty: TypeId) -> Nullability {
        self.lookup(ty)
            .map(|data| data.nullability())
            .unwrap_or_default()
    }

    fn with_nullability(&self, ty: TypeId, nullability: Nullability) -> TypeId {
        self.db().with_nullability(ty, nullability)
    }

    /// `ty` without its `?` suffix.
    fn non_nullable(&self, ty: TypeId) -> TypeId {
        self.with_nullability(ty, Nullability::NonNullable)
    }

    /// `dynamic`, `void` or `Object?`.
    fn is_top_like(&self, ty: TypeId) -> bool {
        matches!(ty, TypeId::DYNAMIC | TypeId::VOID | TypeId::OBJECT_NULLABLE)
    }

    fn is_dynamic_or_void(&self, ty: TypeId) -> bool {
        matches!(ty, TypeId::DYNAMIC | TypeId::VOID)
    }

    fn is_bottom(&self, ty: TypeId) -> bool {
        ty == TypeId::NEVER
    }

    /// Whether `Null` is certainly not a subtype of `ty`.
    fn is_known_non_nullable(&self, ty: TypeId) -> bool {
        match self.lookup(ty) {
            Some(TypeData::Never) => true,
            Some(TypeData::Eventual(inner, Nullability::NonNullable)) => {
                self.is_known_non_nullable(inner)
            }
            Some(TypeData::TypeParameter(param, Nullability::NonNullable)) => self
                .type_param_bound(param)
                .is_some_and(|bound| self.is_known_non_nullable(bound)),
            Some(
                TypeData::Object(n)
                | TypeData::Interface(_, _, n)
                | TypeData::Function(_, n)
                | TypeData::Record(_, n)
                | TypeData::FunctionTop(n)
                | TypeData::RecordTop(n),
            ) => !n.is_nullable(),
            _ => false,
        }
    }

    /// Whether `Null` is a subtype of `ty`.
    fn is_nullable(&self, ty: TypeId) -> bool {
        match self.lookup(ty) {
            Some(TypeData::Null | TypeData::Dynamic | TypeData::Void | TypeData::Unknown) => true,
            Some(TypeData::Eventual(inner, Nullability::NonNullable)) => self.is_nullable(inner),
            Some(data) => data.nullability().is_nullable(),
            None => false,
        }
    }

    /// `(inner, nullability)` when `ty` is `FutureOr<inner>`.
    fn eventual_inner(&self, ty: TypeId) -> Option<(TypeId, Nullability)> {
        match self.lookup(ty)? {
            TypeData::Eventual(inner, n) => Some((inner, n)),
            _ => None,
        }
    }

    fn function_shape(&self, ty: TypeId) -> Option<(Arc<FunctionShape>, Nullability)> {
        match self.lookup(ty)? {
            TypeData::Function(shape, n) => Some((self.db().function_shape(shape), n)),
            _ => None,
        }
    }

    fn record_shape(&self, ty: TypeId) -> Option<(Arc<RecordShape>, Nullability)> {
        match self.lookup(ty)? {
            TypeData::Record(shape, n) => Some((self.db().record_shape(shape), n)),
            _ => None,
        }
    }

    fn interface_parts(&self, ty: TypeId) -> Option<(DefId, Arc<[TypeId]>, Nullability)> {
        match self.lookup(ty)? {
            TypeData::Interface(def, args, n) => Some((def, self.db().type_list(args), n)),
            _ => None,
        }
    }

    fn type_param_parts(&self, ty: TypeId) -> Option<(TypeParamId, Nullability)> {
        match self.lookup(ty)? {
            TypeData::TypeParameter(param, n) => Some((param, n)),
            _ => None,
        }
    }

    fn type_param_bound(&self, param: TypeParamId) -> Option<TypeId> {
        self.db().type_param_info(param).bound
    }

    /// Allocate a synthetic type parameter, never tracked by any matcher.
    fn fresh_type_param(&self, name: Atom, bound: Option<TypeId>) -> TypeParamId {
        self.db().fresh_type_param(name, bound)
    }

    fn instantiate(&self, ty: TypeId, subst: &TypeSubstitution) -> TypeId {
        instantiate_type(self.db(), ty, subst)
    }

    fn format_type(&self, ty: TypeId) -> String {
        TypeFormatter::with_declarations(self.db(), self.declarations()).format(ty)
    }
}

/// Operations over a [`TypeInterner`] and a [`DefinitionStore`].
pub struct StandardTypeOps<'a> {
    interner: &'a TypeInterner,
    definitions: &'a DefinitionStore,
    core: CoreTypes,
}

impl<'a> StandardTypeOps<'a> {
    pub fn new(
        interner: &'a TypeInterner,
        definitions: &'a DefinitionStore,
        core: CoreTypes,
    ) -> Self {
        StandardTypeOps {
            interner,
            definitions,
            core,
        }
    }

    pub fn interner(&self) -> &'a TypeInterner {
        self.interner
    }

    pub fn definitions(&self) -> &'a DefinitionStore {
        self.definitions
    }

    pub fn core(&self) -> &CoreTypes {
        &self.core
    }
}

impl TypeSystemOps for StandardTypeOps<'_> {
    fn db(&self) -> &dyn TypeDatabase {
        self.interner
    }

    fn declarations(&self) -> &dyn DeclarationResolver {
        self.definitions
    }

    fn future_type(&self, inner: TypeId) -> TypeId {
        self.core.future_of(self.interner, inner)
    }

    fn join(&self, a: TypeId, b: TypeId) -> TypeId {
        lattice::join(self, a, b)
    }

    fn meet(&self, a: TypeId, b: TypeId) -> TypeId {
        lattice::meet(self, a, b)
    }
}

#[cfg(test)]
#[path = "../tests/ops_tests.rs"]
mod tests;
