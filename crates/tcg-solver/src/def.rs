//! Declaration identifiers and storage.
//!
//! A declaration (`DefId`) is the generic class-like entity an interface type
//! instantiates: `List` in `List<int>`. The store records, per declaration,
//! its type parameters, the declared variance of each parameter and its
//! immediate supertypes written in terms of those parameters.
//!
//! The matcher never reads the store directly. It goes through the
//! [`DeclarationResolver`] trait, so a host type system can supply its own
//! declarations.

use crate::db::TypeDatabase;
use crate::instantiate::{TypeSubstitution, instantiate_type};
use crate::types::{Nullability, TypeData, TypeId, TypeParamId};
use crate::variance::Variance;
use dashmap::DashMap;
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use tcg_common::interner::Atom;
use tracing::trace;

// =============================================================================
// DefId
// =============================================================================

/// Declaration identifier owned by the solver.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct DefId(pub u32);

impl DefId {
    /// Sentinel value for invalid `DefId`.
    pub const INVALID: Self = Self(0);

    /// First valid `DefId`.
    pub const FIRST_VALID: u32 = 1;

    pub const fn is_valid(self) -> bool {
        self.0 >= Self::FIRST_VALID
    }
}

/// Kind of declaration.
///
/// Rule 15 of the matcher only relates interface types whose declarations
/// have the same kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DefKind {
    /// Ordinary class or interface.
    Interface,
    /// Extension-type declaration: a nominal wrapper that only relates to
    /// other extension types.
    Extension,
}

// =============================================================================
// DefinitionInfo
// =============================================================================

/// Stored information about a declaration.
#[derive(Clone, Debug)]
pub struct DefinitionInfo {
    pub kind: DefKind,
    /// Name of the declaration (for formatting and diagnostics)
    pub name: Atom,
    /// Type parameters, in declaration order
    pub type_params: Vec<TypeParamId>,
    /// Declared variance of each type parameter (parallel to `type_params`)
    pub variances: Vec<Variance>,
    /// Immediate supertypes, expressed in terms of `type_params`
    pub supertypes: Vec<TypeId>,
}

impl DefinitionInfo {
    /// An ordinary interface declaration with the given parameters.
    pub fn interface(name: Atom, params: Vec<(TypeParamId, Variance)>) -> Self {
        Self::with_kind(DefKind::Interface, name, params)
    }

    /// An extension-type declaration.
    pub fn extension(name: Atom, params: Vec<(TypeParamId, Variance)>) -> Self {
        Self::with_kind(DefKind::Extension, name, params)
    }

    fn with_kind(kind: DefKind, name: Atom, params: Vec<(TypeParamId, Variance)>) -> Self {
        let (type_params, variances) = params.into_iter().unzip();
        Self {
            kind,
            name,
            type_params,
            variances,
            supertypes: Vec::new(),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while registering declaration data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionError {
    /// The declaration is not registered in the store.
    UnknownDefinition(DefId),
    /// A supertype is not a non-nullable interface type.
    NotAnInterface { def: DefId, supertype: TypeId },
    /// Adding the supertype would make `def` its own supertype.
    SupertypeCycle { def: DefId, supertype: DefId },
    /// A supertype passes the wrong number of type arguments.
    ArityMismatch {
        def: DefId,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionError::UnknownDefinition(def) => {
                write!(f, "unknown declaration #{}", def.0)
            }
            DefinitionError::NotAnInterface { def, supertype } => {
                write!(
                    f,
                    "supertype #{} of declaration #{} is not an interface type",
                    supertype.0, def.0
                )
            }
            DefinitionError::SupertypeCycle { def, supertype } => {
                write!(
                    f,
                    "declaration #{} cannot extend #{}: the supertype graph would contain a cycle",
                    def.0, supertype.0
                )
            }
            DefinitionError::ArityMismatch {
                def,
                expected,
                found,
            } => {
                write!(
                    f,
                    "declaration #{} expects {} type arguments, found {}",
                    def.0, expected, found
                )
            }
        }
    }
}

impl std::error::Error for DefinitionError {}

// =============================================================================
// DeclarationResolver
// =============================================================================

/// Declaration queries consumed by the matcher.
pub trait DeclarationResolver {
    fn kind(&self, def: DefId) -> Option<DefKind>;

    fn name(&self, def: DefId) -> Option<Atom>;

    fn type_params(&self, def: DefId) -> Vec<TypeParamId>;

    /// Declared variance of the type parameter at `index`.
    ///
    /// Out-of-range indices and unknown declarations report covariance.
    fn variance(&self, def: DefId, index: usize) -> Variance;

    /// Immediate supertypes of `def` with `args` substituted for its
    /// type parameters.
    fn supertypes(&self, db: &dyn TypeDatabase, def: DefId, args: &[TypeId]) -> Vec<TypeId>;
}

// =============================================================================
// DefinitionStore
// =============================================================================

/// Thread-safe storage for declarations.
///
/// Uses `DashMap` so a host can register declarations from several threads.
///
/// ```ignore
/// let store = DefinitionStore::new();
/// let e = interner.fresh_type_param(interner.intern_string("E"), None);
/// let iterable = store.register(DefinitionInfo::interface(
///     interner.intern_string("Iterable"),
///     vec![(e, Variance::COVARIANT)],
/// ));
/// ```
pub struct DefinitionStore {
    definitions: DashMap<DefId, DefinitionInfo>,
    next_id: AtomicU32,
}

impl Default for DefinitionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self {
            definitions: DashMap::new(),
            next_id: AtomicU32::new(DefId::FIRST_VALID),
        }
    }

    fn allocate(&self) -> DefId {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        trace!(allocated_def_id = id, "DefinitionStore::allocate");
        DefId(id)
    }

    /// Register a new declaration and return its `DefId`.
    ///
    /// Supertypes carried by `info` are not validated; use
    /// [`add_supertypes`](Self::add_supertypes) to attach them.
    pub fn register(&self, info: DefinitionInfo) -> DefId {
        let id = self.allocate();
        trace!(
            def_id = id.0,
            kind = ?info.kind,
            params = info.type_params.len(),
            "DefinitionStore::register"
        );
        self.definitions.insert(id, info);
        id
    }

    pub fn get(&self, id: DefId) -> Option<DefinitionInfo> {
        self.definitions.get(&id).map(|r| r.clone())
    }

    pub fn contains(&self, id: DefId) -> bool {
        self.definitions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Attach immediate supertypes to `def`.
    ///
    /// Every supertype must be a non-nullable interface type of a registered
    /// declaration, with the right number of type arguments, and must not
    /// close a cycle in the supertype graph. Nothing is added when any
    /// supertype is rejected.
    pub fn add_supertypes(
        &self,
        db: &dyn TypeDatabase,
        def: DefId,
        supertypes: Vec<TypeId>,
    ) -> Result<(), DefinitionError> {
        if !self.contains(def) {
            return Err(DefinitionError::UnknownDefinition(def));
        }

        for &supertype in &supertypes {
            let Some(TypeData::Interface(super_def, args, Nullability::NonNullable)) =
                db.lookup(supertype)
            else {
                return Err(DefinitionError::NotAnInterface { def, supertype });
            };
            let expected = self
                .definitions
                .get(&super_def)
                .map(|info| info.type_params.len())
                .ok_or(DefinitionError::UnknownDefinition(super_def))?;
            let found = db.type_list(args).len();
            if expected != found {
                return Err(DefinitionError::ArityMismatch {
                    def: super_def,
                    expected,
                    found,
                });
            }
            if super_def == def || self.is_derived_from(db, super_def, def) {
                return Err(DefinitionError::SupertypeCycle {
                    def,
                    supertype: super_def,
                });
            }
        }

        trace!(def_id = def.0, count = supertypes.len(), "DefinitionStore::add_supertypes");
        if let Some(mut info) = self.definitions.get_mut(&def) {
            info.supertypes.extend(supertypes);
        }
        Ok(())
    }

    /// Whether `base` is reachable from `derived` through supertype links.
    /// A declaration is not derived from itself.
    pub fn is_derived_from(&self, db: &dyn TypeDatabase, derived: DefId, base: DefId) -> bool {
        let mut visited = FxHashSet::default();
        let mut worklist = vec![derived];

        while let Some(current) = worklist.pop() {
            let Some(info) = self.definitions.get(&current) else {
                continue;
            };
            for &supertype in &info.supertypes {
                if let Some(TypeData::Interface(super_def, _, _)) = db.lookup(supertype) {
                    if super_def == base {
                        return true;
                    }
                    if visited.insert(super_def) {
                        worklist.push(super_def);
                    }
                }
            }
        }
        false
    }
}

impl DeclarationResolver for DefinitionStore {
    fn kind(&self, def: DefId) -> Option<DefKind> {
        self.definitions.get(&def).map(|r| r.kind)
    }

    fn name(&self, def: DefId) -> Option<Atom> {
        self.definitions.get(&def).map(|r| r.name)
    }

    fn type_params(&self, def: DefId) -> Vec<TypeParamId> {
        self.definitions
            .get(&def)
            .map(|r| r.type_params.clone())
            .unwrap_or_default()
    }

    fn variance(&self, def: DefId, index: usize) -> Variance {
        self.definitions
            .get(&def)
            .and_then(|r| r.variances.get(index).copied())
            .unwrap_or(Variance::COVARIANT)
    }

    fn supertypes(&self, db: &dyn TypeDatabase, def: DefId, args: &[TypeId]) -> Vec<TypeId> {
        let Some(info) = self.get(def) else {
            return Vec::new();
        };
        if info.type_params.is_empty() {
            return info.supertypes;
        }
        let subst = TypeSubstitution::from_args(&info.type_params, args);
        info.supertypes
            .iter()
            .map(|&supertype| instantiate_type(db, supertype, &subst))
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/def_tests.rs"]
mod tests;
