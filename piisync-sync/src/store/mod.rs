//! Persistent pattern table.
//!
//! [`PatternStore`] is the capability surface the reconciler needs:
//! find-all, batch delete by id, update by name, create, and an explicit
//! `disconnect`. Implementations open their connection lazily on the first
//! operation, so a store handle can live across cycles while holding a
//! connection only during one.

use std::ops::{Deref, DerefMut};

use piisync_core::{PatternName, PatternRecord, StoredPattern};

use crate::error::StoreError;

pub mod memory;
pub mod sqlite;

pub trait PatternStore {
    /// Every stored pattern, in insertion order.
    fn find_many(&mut self) -> Result<Vec<StoredPattern>, StoreError>;

    /// Delete the rows with the given ids. Returns the number deleted.
    fn delete_many(&mut self, ids: &[i64]) -> Result<usize, StoreError>;

    /// Replace the payload of every row named `name`. Returns the number updated.
    fn update_many(&mut self, name: &PatternName, data: &PatternRecord)
        -> Result<usize, StoreError>;

    fn create(&mut self, data: &PatternRecord) -> Result<StoredPattern, StoreError>;

    /// Start grouping the following writes. No-op for stores without transactions.
    fn begin(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Release the connection. Safe to call when not connected.
    fn disconnect(&mut self) -> Result<(), StoreError>;
}

impl<T: PatternStore + ?Sized> PatternStore for Box<T> {
    fn find_many(&mut self) -> Result<Vec<StoredPattern>, StoreError> {
        (**self).find_many()
    }

    fn delete_many(&mut self, ids: &[i64]) -> Result<usize, StoreError> {
        (**self).delete_many(ids)
    }

    fn update_many(
        &mut self,
        name: &PatternName,
        data: &PatternRecord,
    ) -> Result<usize, StoreError> {
        (**self).update_many(name, data)
    }

    fn create(&mut self, data: &PatternRecord) -> Result<StoredPattern, StoreError> {
        (**self).create(data)
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        (**self).begin()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        (**self).commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        (**self).rollback()
    }

    fn disconnect(&mut self) -> Result<(), StoreError> {
        (**self).disconnect()
    }
}

/// Borrow of a store for exactly one cycle.
///
/// Dropping the session disconnects the store, whichever way the cycle ended.
pub struct StoreSession<'a, S: PatternStore + ?Sized> {
    store: &'a mut S,
}

impl<'a, S: PatternStore + ?Sized> StoreSession<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }
}

impl<S: PatternStore + ?Sized> Deref for StoreSession<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: PatternStore + ?Sized> DerefMut for StoreSession<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: PatternStore + ?Sized> Drop for StoreSession<'_, S> {
    fn drop(&mut self) {
        if let Err(err) = self.store.disconnect() {
            tracing::warn!("failed to release store connection: {}", err);
        }
    }
}
