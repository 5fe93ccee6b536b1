//! # piisync-sync
//!
//! Pattern-table persistence and reconciliation.
//!
//! Call [`pipeline::run_cycle`] to fetch the remote pattern list and converge
//! a [`PatternStore`] to it, or [`reconcile::reconcile`] when the fetched
//! list is already in hand.

pub mod error;
pub mod pipeline;
pub mod reconcile;
pub mod store;

pub use error::{CycleError, ReconcileError, StoreError, StoreOp};
pub use reconcile::{reconcile, PlannedWrite, ReconcilePlan, ReconcileReport};
pub use store::memory::{MemoryPatternStore, StoreCall};
pub use store::sqlite::SqlitePatternStore;
pub use store::{PatternStore, StoreSession};
