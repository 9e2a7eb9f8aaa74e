//! Type interning for structural deduplication.
//!
//! This module implements the interning engine that converts `TypeData`
//! structures into lightweight `TypeId` handles.
//!
//! Benefits:
//! - O(1) structural equality (just compare `TypeId` values)
//! - Memory efficient (each unique structure stored once)
//!
//! The interner also owns the type parameter arena. Type parameters are
//! identities, not structures, so they are allocated rather than interned.
//! Parameters the solver synthesizes are shared per [`SyntheticParams`] key,
//! so repeated matching allocates them once.

use crate::def::DefId;
use crate::types::{
    FunctionShape, FunctionShapeId, Nullability, RecordShape, RecordShapeId, TypeData, TypeId,
    TypeListId, TypeParamId, TypeParamInfo,
};
use dashmap::DashMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHasher};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};
use tcg_common::interner::{Atom, ShardedInterner};
use tracing::trace;

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS; // 16 shards
const SHARD_MASK: u32 = (SHARD_COUNT as u32) - 1;

struct TypeShard {
    key_to_index: RwLock<FxHashMap<TypeData, u32>>,
    index_to_key: RwLock<Vec<TypeData>>,
}

impl TypeShard {
    fn new() -> Self {
        TypeShard {
            key_to_index: RwLock::new(FxHashMap::default()),
            index_to_key: RwLock::new(Vec::new()),
        }
    }
}

struct SliceInterner<T> {
    items: Vec<Arc<[T]>>,
    map: FxHashMap<Arc<[T]>, u32>,
}

impl<T> SliceInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        let empty: Arc<[T]> = Arc::from(Vec::new());
        let mut map = FxHashMap::default();
        map.insert(empty.clone(), 0);
        SliceInterner {
            items: vec![empty],
            map,
        }
    }

    fn intern(&mut self, items: Vec<T>) -> u32 {
        if items.is_empty() {
            return 0;
        }

        if let Some(&id) = self.map.get(items.as_slice()) {
            return id;
        }

        let arc: Arc<[T]> = items.into();
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<[T]>> {
        self.items.get(id as usize).cloned()
    }

    fn empty(&self) -> Arc<[T]> {
        self.items[0].clone()
    }
}

struct ValueInterner<T> {
    items: Vec<Arc<T>>,
    map: FxHashMap<Arc<T>, u32>,
}

impl<T> ValueInterner<T>
where
    T: Eq + Hash,
{
    fn new() -> Self {
        ValueInterner {
            items: Vec::new(),
            map: FxHashMap::default(),
        }
    }

    fn intern(&mut self, value: T) -> u32 {
        if let Some(&id) = self.map.get(&value) {
            return id;
        }

        let arc = Arc::new(value);
        let id = self.items.len() as u32;
        self.items.push(arc.clone());
        self.map.insert(arc, id);
        id
    }

    fn get(&self, id: u32) -> Option<Arc<T>> {
        self.items.get(id as usize).cloned()
    }
}

/// What a set of synthesized type parameters stands for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SyntheticParams {
    /// Shared parameters for comparing the generic function types `p` and `q`.
    Comparison { p: TypeId, q: TypeId, left_schema: bool },
    /// Replacements for `params` once substitution turned their bounds into
    /// `bounds`.
    Rebound {
        params: Arc<[TypeParamId]>,
        bounds: Arc<[Option<TypeId>]>,
    },
}

/// Type interning table.
/// Thread-safe via `RwLock` for concurrent access.
pub struct TypeInterner {
    /// Sharded storage for non-intrinsic types
    shards: [TypeShard; SHARD_COUNT],
    /// String interner for declaration, parameter and field names
    pub string_interner: ShardedInterner,
    type_lists: RwLock<SliceInterner<TypeId>>,
    function_shapes: RwLock<ValueInterner<FunctionShape>>,
    record_shapes: RwLock<ValueInterner<RecordShape>>,
    type_params: RwLock<Vec<TypeParamInfo>>,
    synthetic_params: DashMap<SyntheticParams, Arc<[TypeParamId]>, FxBuildHasher>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    /// Create a new type interner with pre-registered intrinsics
    pub fn new() -> Self {
        TypeInterner {
            shards: std::array::from_fn(|_| TypeShard::new()),
            string_interner: {
                let interner = ShardedInterner::new();
                interner.intern_common();
                interner
            },
            type_lists: RwLock::new(SliceInterner::new()),
            function_shapes: RwLock::new(ValueInterner::new()),
            record_shapes: RwLock::new(ValueInterner::new()),
            type_params: RwLock::new(Vec::new()),
            synthetic_params: DashMap::default(),
        }
    }

    /// Intern a string into an Atom.
    pub fn intern_string(&self, s: &str) -> Atom {
        self.string_interner.intern(s)
    }

    /// Resolve an Atom back to its string value.
    pub fn resolve_atom(&self, atom: Atom) -> String {
        self.string_interner.resolve(atom).to_string()
    }

    /// Resolve an Atom without allocating a new String.
    pub fn resolve_atom_ref(&self, atom: Atom) -> Arc<str> {
        self.string_interner.resolve(atom)
    }

    pub fn type_list(&self, id: TypeListId) -> Arc<[TypeId]> {
        let lists = self.type_lists.read().expect("type_lists lock poisoned");
        lists.get(id.0).unwrap_or_else(|| lists.empty())
    }

    pub fn function_shape(&self, id: FunctionShapeId) -> Arc<FunctionShape> {
        self.function_shapes
            .read()
            .expect("function_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_else(|| {
                Arc::new(FunctionShape {
                    type_params: Vec::new(),
                    positional: Vec::new(),
                    named: Vec::new(),
                    return_type: TypeId::NEVER,
                })
            })
    }

    pub fn record_shape(&self, id: RecordShapeId) -> Arc<RecordShape> {
        self.record_shapes
            .read()
            .expect("record_shapes lock poisoned")
            .get(id.0)
            .unwrap_or_default()
    }

    // =========================================================================
    // Type parameter arena
    // =========================================================================

    /// Allocate a new type parameter. Every call yields a distinct identity.
    pub fn fresh_type_param(&self, name: Atom, bound: Option<TypeId>) -> TypeParamId {
        let mut params = self.type_params.write().expect("type_params lock poisoned");
        let id = TypeParamId(params.len() as u32);
        params.push(TypeParamInfo { name, bound });
        trace!(param = id.0, ?bound, "TypeInterner::fresh_type_param");
        id
    }

    /// Set the bound of an allocated type parameter.
    ///
    /// Bounds are assigned after allocation so that F-bounded parameters
    /// (`T extends Comparable<T>`) can refer to themselves.
    pub fn set_type_param_bound(&self, id: TypeParamId, bound: Option<TypeId>) {
        let mut params = self.type_params.write().expect("type_params lock poisoned");
        if let Some(info) = params.get_mut(id.0 as usize) {
            info.bound = bound;
        }
    }

    /// The parameters standing for `key`, allocated by `make` on first use.
    ///
    /// `make` runs without any lock held, so it may allocate, set bounds and
    /// instantiate. When two threads race on one key the first stored set
    /// wins and the other is dropped.
    pub fn synthetic_type_params(
        &self,
        key: SyntheticParams,
        make: &mut dyn FnMut() -> Vec<TypeParamId>,
    ) -> Arc<[TypeParamId]> {
        if let Some(params) = self.synthetic_params.get(&key) {
            return params.clone();
        }
        let made: Arc<[TypeParamId]> = make().into();
        trace!(?key, count = made.len(), "TypeInterner::synthetic_type_params");
        self.synthetic_params.entry(key).or_insert(made).clone()
    }

    /// Number of type parameters allocated so far.
    pub fn type_param_count(&self) -> usize {
        self.type_params
            .read()
            .expect("type_params lock poisoned")
            .len()
    }

    pub fn type_param_info(&self, id: TypeParamId) -> TypeParamInfo {
        self.type_params
            .read()
            .expect("type_params lock poisoned")
            .get(id.0 as usize)
            .cloned()
            .unwrap_or(TypeParamInfo {
                name: Atom::NONE,
                bound: None,
            })
    }

    // =========================================================================
    // Interning
    // =========================================================================

    /// Intern a type key and return its `TypeId`.
    /// If the key already exists, returns the existing `TypeId`.
    pub fn intern(&self, key: TypeData) -> TypeId {
        if let Some(id) = Self::get_intrinsic_id(&key) {
            return id;
        }

        let mut hasher = FxHasher::default();
        key.hash(&mut hasher);
        let shard_idx = (hasher.finish() as usize) & (SHARD_COUNT - 1);
        let shard = &self.shards[shard_idx];

        {
            let map = shard
                .key_to_index
                .read()
                .expect("shard key_to_index lock poisoned");
            if let Some(&local_index) = map.get(&key) {
                return Self::make_id(local_index, shard_idx as u32);
            }
        }

        let mut map = shard
            .key_to_index
            .write()
            .expect("shard key_to_index lock poisoned");
        let mut storage = shard
            .index_to_key
            .write()
            .expect("shard index_to_key lock poisoned");

        if let Some(&local_index) = map.get(&key) {
            return Self::make_id(local_index, shard_idx as u32);
        }

        let local_index = storage.len() as u32;
        assert!(
            local_index <= ((u32::MAX - TypeId::FIRST_USER) >> SHARD_BITS),
            "type interner shard {shard_idx} is full"
        );

        storage.push(key.clone());
        map.insert(key, local_index);

        Self::make_id(local_index, shard_idx as u32)
    }

    /// Look up the structure behind a `TypeId`.
    pub fn lookup(&self, id: TypeId) -> Option<TypeData> {
        if id.is_intrinsic() {
            return Self::get_intrinsic_key(id);
        }

        let raw = id.0 - TypeId::FIRST_USER;
        let shard_idx = (raw & SHARD_MASK) as usize;
        let local_index = (raw >> SHARD_BITS) as usize;
        let shard = self.shards.get(shard_idx)?;
        let storage = shard
            .index_to_key
            .read()
            .expect("shard index_to_key lock poisoned");
        storage.get(local_index).cloned()
    }

    #[inline]
    fn make_id(local_index: u32, shard_idx: u32) -> TypeId {
        TypeId(TypeId::FIRST_USER + ((local_index << SHARD_BITS) | (shard_idx & SHARD_MASK)))
    }

    fn get_intrinsic_id(key: &TypeData) -> Option<TypeId> {
        let id = match key {
            TypeData::Unknown => TypeId::UNKNOWN,
            TypeData::Dynamic => TypeId::DYNAMIC,
            TypeData::Void => TypeId::VOID,
            TypeData::Never => TypeId::NEVER,
            TypeData::Null => TypeId::NULL,
            TypeData::Object(Nullability::NonNullable) => TypeId::OBJECT,
            TypeData::Object(Nullability::Nullable) => TypeId::OBJECT_NULLABLE,
            TypeData::FunctionTop(Nullability::NonNullable) => TypeId::FUNCTION,
            TypeData::FunctionTop(Nullability::Nullable) => TypeId::FUNCTION_NULLABLE,
            TypeData::RecordTop(Nullability::NonNullable) => TypeId::RECORD,
            TypeData::RecordTop(Nullability::Nullable) => TypeId::RECORD_NULLABLE,
            _ => return None,
        };
        Some(id)
    }

    fn get_intrinsic_key(id: TypeId) -> Option<TypeData> {
        let key = match id {
            TypeId::UNKNOWN => TypeData::Unknown,
            TypeId::DYNAMIC => TypeData::Dynamic,
            TypeId::VOID => TypeData::Void,
            TypeId::NEVER => TypeData::Never,
            TypeId::NULL => TypeData::Null,
            TypeId::OBJECT => TypeData::Object(Nullability::NonNullable),
            TypeId::OBJECT_NULLABLE => TypeData::Object(Nullability::Nullable),
            TypeId::FUNCTION => TypeData::FunctionTop(Nullability::NonNullable),
            TypeId::FUNCTION_NULLABLE => TypeData::FunctionTop(Nullability::Nullable),
            TypeId::RECORD => TypeData::RecordTop(Nullability::NonNullable),
            TypeId::RECORD_NULLABLE => TypeData::RecordTop(Nullability::Nullable),
            _ => return None,
        };
        Some(key)
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn type_list_id(&self, items: Vec<TypeId>) -> TypeListId {
        let mut lists = self.type_lists.write().expect("type_lists lock poisoned");
        TypeListId(lists.intern(items))
    }

    /// `C<args>` for an interface or extension declaration.
    pub fn interface(&self, def: DefId, args: Vec<TypeId>) -> TypeId {
        let list = self.type_list_id(args);
        self.intern(TypeData::Interface(def, list, Nullability::NonNullable))
    }

    /// A non-nullable reference to a type parameter.
    pub fn type_param(&self, param: TypeParamId) -> TypeId {
        self.intern(TypeData::TypeParameter(param, Nullability::NonNullable))
    }

    /// `FutureOr<inner>`.
    pub fn eventual(&self, inner: TypeId) -> TypeId {
        self.intern(TypeData::Eventual(inner, Nullability::NonNullable))
    }

    /// Intern a function type.
    ///
    /// Named parameters are sorted by name. Panics when a required positional
    /// parameter follows an optional one, or when a name repeats.
    pub fn function(&self, mut shape: FunctionShape) -> TypeId {
        let required = shape.required_positional_count();
        assert!(
            shape.positional[required..].iter().all(|p| !p.required),
            "required positional parameter after an optional one"
        );
        shape
            .named
            .sort_by(|a, b| self.resolve_atom_ref(a.name).cmp(&self.resolve_atom_ref(b.name)));
        assert!(
            shape.named.windows(2).all(|w| w[0].name != w[1].name),
            "duplicate named parameter"
        );

        let id = {
            let mut shapes = self
                .function_shapes
                .write()
                .expect("function_shapes lock poisoned");
            FunctionShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Function(id, Nullability::NonNullable))
    }

    /// Intern a record type. Named fields are sorted by name.
    pub fn record(&self, mut shape: RecordShape) -> TypeId {
        shape
            .named
            .sort_by(|a, b| self.resolve_atom_ref(a.name).cmp(&self.resolve_atom_ref(b.name)));
        assert!(
            shape.named.windows(2).all(|w| w[0].name != w[1].name),
            "duplicate named record field"
        );

        let id = {
            let mut shapes = self
                .record_shapes
                .write()
                .expect("record_shapes lock poisoned");
            RecordShapeId(shapes.intern(shape))
        };
        self.intern(TypeData::Record(id, Nullability::NonNullable))
    }

    /// Replace the nullability suffix of `ty`.
    pub fn with_nullability(&self, ty: TypeId, nullability: Nullability) -> TypeId {
        match self.lookup(ty) {
            Some(data) => {
                if data.nullability() == nullability {
                    return ty;
                }
                self.intern(data.with_nullability(nullability))
            }
            None => ty,
        }
    }

    /// `ty?`.
    pub fn nullable(&self, ty: TypeId) -> TypeId {
        self.with_nullability(ty, Nullability::Nullable)
    }
}

#[cfg(test)]
#[path = "../tests/intern_tests.rs"]
mod tests;
