//! In-memory [`PatternStore`] with a call log and failure injection.
//!
//! Has no transactions: `begin`/`commit`/`rollback` are recorded but a
//! failure mid-apply leaves earlier writes in place, the same as a store
//! without transactional support.

use piisync_core::{PatternName, PatternRecord, StoredPattern};

use crate::error::{StoreError, StoreOp};
use crate::store::PatternStore;

/// One recorded call against a [`MemoryPatternStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    FindMany,
    DeleteMany(Vec<i64>),
    UpdateMany(PatternName),
    Create(PatternName),
    Begin,
    Commit,
    Rollback,
    Disconnect,
}

impl StoreCall {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            StoreCall::DeleteMany(_) | StoreCall::UpdateMany(_) | StoreCall::Create(_)
        )
    }
}

#[derive(Debug, Default)]
pub struct MemoryPatternStore {
    rows: Vec<StoredPattern>,
    next_id: i64,
    connected: bool,
    calls: Vec<StoreCall>,
    fail_on: Option<StoreOp>,
}

impl MemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with `records`, ids assigned from 1.
    pub fn with_records(records: impl IntoIterator<Item = PatternRecord>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert_row(record);
        }
        store
    }

    /// Make the first subsequent call of `op` fail.
    pub fn fail_on(&mut self, op: StoreOp) {
        self.fail_on = Some(op);
    }

    /// Current contents in id order.
    pub fn records(&self) -> Vec<PatternRecord> {
        self.rows.iter().map(|row| row.record.clone()).collect()
    }

    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn mutation_count(&self) -> usize {
        self.calls.iter().filter(|call| call.is_mutation()).count()
    }

    pub fn disconnect_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Disconnect))
            .count()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn insert_row(&mut self, record: PatternRecord) -> StoredPattern {
        self.next_id += 1;
        let row = StoredPattern {
            id: self.next_id,
            record,
        };
        self.rows.push(row.clone());
        row
    }

    fn enter(&mut self, op: StoreOp, call: StoreCall) -> Result<(), StoreError> {
        self.connected = true;
        self.calls.push(call);
        if self.fail_on == Some(op) {
            self.fail_on = None;
            return Err(StoreError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

impl PatternStore for MemoryPatternStore {
    fn find_many(&mut self) -> Result<Vec<StoredPattern>, StoreError> {
        self.enter(StoreOp::FindMany, StoreCall::FindMany)?;
        Ok(self.rows.clone())
    }

    fn delete_many(&mut self, ids: &[i64]) -> Result<usize, StoreError> {
        self.enter(StoreOp::DeleteMany, StoreCall::DeleteMany(ids.to_vec()))?;
        let before = self.rows.len();
        self.rows.retain(|row| !ids.contains(&row.id));
        Ok(before - self.rows.len())
    }

    fn update_many(
        &mut self,
        name: &PatternName,
        data: &PatternRecord,
    ) -> Result<usize, StoreError> {
        self.enter(StoreOp::UpdateMany, StoreCall::UpdateMany(name.clone()))?;
        let mut updated = 0;
        for row in self.rows.iter_mut().filter(|row| &row.record.name == name) {
            row.record = data.clone();
            updated += 1;
        }
        Ok(updated)
    }

    fn create(&mut self, data: &PatternRecord) -> Result<StoredPattern, StoreError> {
        self.enter(StoreOp::Create, StoreCall::Create(data.name.clone()))?;
        Ok(self.insert_row(data.clone()))
    }

    fn begin(&mut self) -> Result<(), StoreError> {
        self.enter(StoreOp::Begin, StoreCall::Begin)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.enter(StoreOp::Commit, StoreCall::Commit)
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.calls.push(StoreCall::Rollback);
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), StoreError> {
        self.calls.push(StoreCall::Disconnect);
        self.connected = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_rows_get_sequential_ids() {
        let mut store = MemoryPatternStore::with_records([
            PatternRecord::new("a", "1", false, false),
            PatternRecord::new("b", "2", false, false),
        ]);
        let rows = store.find_many().unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(store.calls(), [StoreCall::FindMany]);
    }

    #[test]
    fn injected_failure_fires_once() {
        let mut store = MemoryPatternStore::new();
        store.fail_on(StoreOp::Create);
        let record = PatternRecord::new("a", "1", false, false);
        assert!(store.create(&record).is_err());
        assert!(store.create(&record).is_ok());
        assert_eq!(store.records(), vec![record]);
    }

    #[test]
    fn disconnect_clears_connection_flag() {
        let mut store = MemoryPatternStore::new();
        store.find_many().unwrap();
        assert!(store.is_connected());
        store.disconnect().unwrap();
        assert!(!store.is_connected());
        assert_eq!(store.disconnect_count(), 1);
    }
}
