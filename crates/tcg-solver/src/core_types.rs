//! Declarations the matcher depends on by name.
//!
//! `FutureOr<T>` is the union of `T` and `Future<T>`, so the eventual rules
//! need a `Future` declaration. [`CoreTypes::register`] creates it in a
//! store; hosts with their own `Future` can use [`CoreTypes::from_future`].

use crate::db::TypeDatabase;
use crate::def::{DefId, DefinitionInfo, DefinitionStore};
use crate::types::TypeId;
use crate::variance::Variance;

#[derive(Copy, Clone, Debug)]
pub struct CoreTypes {
    future: DefId,
}

impl CoreTypes {
    /// Register `Future<T>` (covariant in `T`).
    pub fn register(db: &dyn TypeDatabase, definitions: &DefinitionStore) -> Self {
        let t = db.fresh_type_param(db.intern_string("T"), None);
        let future = definitions.register(DefinitionInfo::interface(
            db.intern_string("Future"),
            vec![(t, Variance::COVARIANT)],
        ));
        CoreTypes { future }
    }

    /// Use an existing one-parameter `Future` declaration.
    pub const fn from_future(future: DefId) -> Self {
        CoreTypes { future }
    }

    pub const fn future(&self) -> DefId {
        self.future
    }

    pub fn future_of(&self, db: &dyn TypeDatabase, inner: TypeId) -> TypeId {
        db.interface(self.future, vec![inner])
    }
}
