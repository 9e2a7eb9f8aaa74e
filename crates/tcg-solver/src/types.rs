//! Type representation for the constraint engine.
//!
//! Types are interned: a [`TypeId`] identifies one unique structure stored in
//! the [`TypeInterner`](crate::TypeInterner). Two types are structurally
//! equal exactly when their ids are equal.
//!
//! Nullability is a modifier carried by the variants for which it is
//! meaningful. `dynamic`, `void`, `Null`, `Never` and the unknown schema
//! placeholder have no suffix.

use crate::def::DefId;
use serde::Serialize;
use tcg_common::interner::Atom;

/// Interned type handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    /// The schema placeholder `_`: matches anything, contributes nothing.
    pub const UNKNOWN: TypeId = TypeId(0);
    pub const DYNAMIC: TypeId = TypeId(1);
    pub const VOID: TypeId = TypeId(2);
    /// The bottom type.
    pub const NEVER: TypeId = TypeId(3);
    pub const NULL: TypeId = TypeId(4);
    /// Non-nullable `Object`.
    pub const OBJECT: TypeId = TypeId(5);
    /// `Object?`, one of the top-like types.
    pub const OBJECT_NULLABLE: TypeId = TypeId(6);
    /// `Function`, the supertype of every function type.
    pub const FUNCTION: TypeId = TypeId(7);
    pub const FUNCTION_NULLABLE: TypeId = TypeId(8);
    /// `Record`, the supertype of every record type.
    pub const RECORD: TypeId = TypeId(9);
    pub const RECORD_NULLABLE: TypeId = TypeId(10);

    /// First id handed out for non-intrinsic types.
    pub const FIRST_USER: u32 = 100;

    #[inline]
    pub const fn is_intrinsic(self) -> bool {
        self.0 < Self::FIRST_USER
    }

    #[inline]
    pub fn is_unknown(self) -> bool {
        self == Self::UNKNOWN
    }

    #[inline]
    pub fn is_never(self) -> bool {
        self == Self::NEVER
    }

    #[inline]
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

/// Nullability suffix of a type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Nullability {
    #[default]
    NonNullable,
    /// Written `T?`.
    Nullable,
}

impl Nullability {
    #[inline]
    pub const fn is_nullable(self) -> bool {
        matches!(self, Self::Nullable)
    }

    /// `Nullable` if either side is.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        if self.is_nullable() || other.is_nullable() {
            Self::Nullable
        } else {
            Self::NonNullable
        }
    }
}

/// Identity of a type parameter.
///
/// Type parameters are never compared structurally: two parameters with the
/// same name and bound are still different parameters. Inference variables are
/// the type parameters a matcher has been asked to track.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeParamId(pub u32);

/// Declared information for a type parameter.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeParamInfo {
    pub name: Atom,
    /// Declared bound, if any. An absent bound behaves like `Object?`.
    pub bound: Option<TypeId>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeListId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShapeId(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordShapeId(pub u32);

/// A positional function parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamInfo {
    pub type_id: TypeId,
    pub required: bool,
}

impl ParamInfo {
    pub const fn required(type_id: TypeId) -> Self {
        Self {
            type_id,
            required: true,
        }
    }

    pub const fn optional(type_id: TypeId) -> Self {
        Self {
            type_id,
            required: false,
        }
    }
}

/// A named function parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NamedParamInfo {
    pub name: Atom,
    pub type_id: TypeId,
    pub required: bool,
}

impl NamedParamInfo {
    pub const fn new(name: Atom, type_id: TypeId, required: bool) -> Self {
        Self {
            name,
            type_id,
            required,
        }
    }
}

/// Function type structure.
///
/// Positional parameters list the required ones first. Named parameters are
/// sorted by name; the interner establishes that order when the shape is
/// interned.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionShape {
    pub type_params: Vec<TypeParamId>,
    pub positional: Vec<ParamInfo>,
    pub named: Vec<NamedParamInfo>,
    pub return_type: TypeId,
}

impl FunctionShape {
    /// A non-generic function with only required positional parameters.
    pub fn simple(params: Vec<TypeId>, return_type: TypeId) -> Self {
        Self {
            type_params: Vec::new(),
            positional: params.into_iter().map(ParamInfo::required).collect(),
            named: Vec::new(),
            return_type,
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Number of leading required positional parameters.
    pub fn required_positional_count(&self) -> usize {
        self.positional.iter().take_while(|p| p.required).count()
    }
}

/// A named record field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NamedField {
    pub name: Atom,
    pub type_id: TypeId,
}

/// Record (tuple-like) type structure. Named fields are sorted by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RecordShape {
    pub positional: Vec<TypeId>,
    pub named: Vec<NamedField>,
}

/// Structural key of an interned type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// The schema placeholder `_`.
    Unknown,
    Dynamic,
    Void,
    /// Bottom type.
    Never,
    Null,
    /// `Object` / `Object?`.
    Object(Nullability),
    /// An instantiated interface (or extension) declaration.
    Interface(DefId, TypeListId, Nullability),
    /// A reference to a type parameter (possibly an inference variable).
    TypeParameter(TypeParamId, Nullability),
    Function(FunctionShapeId, Nullability),
    Record(RecordShapeId, Nullability),
    /// `FutureOr<T>`: a value of `T` or an asynchronous computation of `T`.
    Eventual(TypeId, Nullability),
    /// `Function`, the supertype of all function types.
    FunctionTop(Nullability),
    /// `Record`, the supertype of all record types.
    RecordTop(Nullability),
}

impl TypeData {
    /// The nullability suffix; types without one report `NonNullable`.
    pub const fn nullability(&self) -> Nullability {
        match self {
            TypeData::Object(n)
            | TypeData::Interface(_, _, n)
            | TypeData::TypeParameter(_, n)
            | TypeData::Function(_, n)
            | TypeData::Record(_, n)
            | TypeData::Eventual(_, n)
            | TypeData::FunctionTop(n)
            | TypeData::RecordTop(n) => *n,
            TypeData::Unknown
            | TypeData::Dynamic
            | TypeData::Void
            | TypeData::Never
            | TypeData::Null => Nullability::NonNullable,
        }
    }

    /// Replace the nullability suffix.
    ///
    /// Types without a suffix are returned unchanged, except that a nullable
    /// `Never` is `Null`.
    pub fn with_nullability(self, nullability: Nullability) -> TypeData {
        match self {
            TypeData::Object(_) => TypeData::Object(nullability),
            TypeData::Interface(def, args, _) => TypeData::Interface(def, args, nullability),
            TypeData::TypeParameter(param, _) => TypeData::TypeParameter(param, nullability),
            TypeData::Function(shape, _) => TypeData::Function(shape, nullability),
            TypeData::Record(shape, _) => TypeData::Record(shape, nullability),
            TypeData::Eventual(inner, _) => TypeData::Eventual(inner, nullability),
            TypeData::FunctionTop(_) => TypeData::FunctionTop(nullability),
            TypeData::RecordTop(_) => TypeData::RecordTop(nullability),
            TypeData::Never if nullability.is_nullable() => TypeData::Null,
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "../tests/types_tests.rs"]
mod tests;
