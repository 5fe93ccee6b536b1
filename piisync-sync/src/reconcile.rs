//! Reconciliation of the stored pattern table against a fetched list.
//!
//! ## Protocol
//!
//! 1. Load every stored pattern.
//! 2. Collect stored names and fetched names.
//! 3. `deletes` = stored patterns whose name is no longer fetched.
//! 4. `has_changes` = counts differ, or `deletes` is non-empty.
//! 5. No changes → no writes.
//! 6. Otherwise delete `deletes` in one batch, then walk the fetched list in
//!    order: update by name when the name was stored, create when it was not.
//!
//! Step 4 is a cardinality check. A pattern whose regex changed while the
//! pattern count stayed the same and nothing was removed does not trigger a
//! write. [`ReconcileOptions::full_diff`] adds a payload comparison for that
//! case and narrows the updates to patterns whose payload differs.
//!
//! Writes run between `begin` and `commit`. On a store with transactions a
//! failed write rolls the whole batch back; on one without, earlier writes
//! stay and the next cycle converges the rest.

use std::collections::{HashMap, HashSet};

use piisync_core::{PatternName, PatternRecord, ReconcileOptions, StoredPattern};

use crate::error::{ReconcileError, StoreOp};
use crate::store::PatternStore;

/// A single write the plan will issue, in fetched order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedWrite {
    /// The name is already stored: replace its payload.
    Update(PatternRecord),
    /// The name is new.
    Create(PatternRecord),
}

impl PlannedWrite {
    pub fn record(&self) -> &PatternRecord {
        match self {
            PlannedWrite::Update(record) | PlannedWrite::Create(record) => record,
        }
    }
}

/// The mutation set computed from a stored and a fetched collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub has_changes: bool,
    pub deletes: Vec<StoredPattern>,
    pub writes: Vec<PlannedWrite>,
}

impl ReconcilePlan {
    pub fn delete_ids(&self) -> Vec<i64> {
        self.deletes.iter().map(|row| row.id).collect()
    }
}

/// Outcome of one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub changed: bool,
    pub deleted: usize,
    pub created: usize,
    pub updated: usize,
}

/// Compute the mutation set. Pure; touches no store.
pub fn plan(
    current: &[StoredPattern],
    fetched: &[PatternRecord],
    options: ReconcileOptions,
) -> ReconcilePlan {
    let current_by_name: HashMap<&PatternName, &PatternRecord> = current
        .iter()
        .map(|row| (row.name(), &row.record))
        .collect();
    let fetched_names: HashSet<&PatternName> = fetched.iter().map(|r| &r.name).collect();

    let deletes: Vec<StoredPattern> = current
        .iter()
        .filter(|row| !fetched_names.contains(row.name()))
        .cloned()
        .collect();

    let payload_changed = options.full_diff
        && fetched.iter().any(|record| {
            current_by_name
                .get(&record.name)
                .is_some_and(|stored| !stored.same_payload(record))
        });

    let has_changes = fetched.len() != current.len() || !deletes.is_empty() || payload_changed;
    if !has_changes {
        return ReconcilePlan::default();
    }

    let writes = fetched
        .iter()
        .filter_map(|record| match current_by_name.get(&record.name) {
            None => Some(PlannedWrite::Create(record.clone())),
            Some(stored) if options.full_diff && stored.same_payload(record) => None,
            Some(_) => Some(PlannedWrite::Update(record.clone())),
        })
        .collect();

    ReconcilePlan {
        has_changes,
        deletes,
        writes,
    }
}

/// Issue the plan's writes against `store`.
///
/// The first failing call aborts the remaining writes and is returned.
pub fn apply<S: PatternStore + ?Sized>(
    store: &mut S,
    plan: &ReconcilePlan,
) -> Result<ReconcileReport, ReconcileError> {
    if !plan.has_changes {
        return Ok(ReconcileReport::default());
    }

    store.begin().map_err(ReconcileError::at(StoreOp::Begin))?;
    match apply_writes(store, plan) {
        Ok(report) => {
            store.commit().map_err(ReconcileError::at(StoreOp::Commit))?;
            Ok(report)
        }
        Err(err) => {
            if let Err(rollback_err) = store.rollback() {
                tracing::warn!("rollback after failed {} also failed: {}", err.op, rollback_err);
            }
            Err(err)
        }
    }
}

fn apply_writes<S: PatternStore + ?Sized>(
    store: &mut S,
    plan: &ReconcilePlan,
) -> Result<ReconcileReport, ReconcileError> {
    let mut report = ReconcileReport {
        changed: true,
        ..ReconcileReport::default()
    };

    if !plan.deletes.is_empty() {
        report.deleted = store
            .delete_many(&plan.delete_ids())
            .map_err(ReconcileError::at(StoreOp::DeleteMany))?;
        tracing::debug!("deleted {} patterns", report.deleted);
    }

    for write in &plan.writes {
        match write {
            PlannedWrite::Update(record) => {
                report.updated += store
                    .update_many(&record.name, record)
                    .map_err(ReconcileError::at(StoreOp::UpdateMany))?;
            }
            PlannedWrite::Create(record) => {
                store
                    .create(record)
                    .map_err(ReconcileError::at(StoreOp::Create))?;
                report.created += 1;
            }
        }
    }

    Ok(report)
}

/// Load the stored table, plan against `fetched`, and apply.
pub fn reconcile<S: PatternStore + ?Sized>(
    store: &mut S,
    fetched: &[PatternRecord],
    options: ReconcileOptions,
) -> Result<ReconcileReport, ReconcileError> {
    let current = store
        .find_many()
        .map_err(ReconcileError::at(StoreOp::FindMany))?;
    let plan = plan(&current, fetched, options);
    tracing::debug!(
        "plan: has_changes={} deletes={} writes={} (stored={}, fetched={})",
        plan.has_changes,
        plan.deletes.len(),
        plan.writes.len(),
        current.len(),
        fetched.len()
    );
    apply(store, &plan)
}
