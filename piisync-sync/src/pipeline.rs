//! One sync cycle: fetch → reconcile → release.
//!
//! This is the single entrypoint used by the daemon worker and by the
//! one-shot dev command.

use piisync_core::ReconcileOptions;
use piisync_source::PatternSource;

use crate::error::CycleError;
use crate::reconcile::{self, ReconcileReport};
use crate::store::{PatternStore, StoreSession};

/// Run one cycle against `store`.
///
/// The store is wrapped in a [`StoreSession`] before anything else happens,
/// so its connection is released on success, on a no-op, and on every error
/// path, including a failed fetch.
pub fn run_cycle<S, T>(
    source: &S,
    store: &mut T,
    options: ReconcileOptions,
) -> Result<ReconcileReport, CycleError>
where
    S: PatternSource + ?Sized,
    T: PatternStore + ?Sized,
{
    let mut session = StoreSession::new(store);

    let fetched = source.fetch()?;
    tracing::debug!("fetched {} patterns from {}", fetched.len(), source.describe());

    let report = reconcile::reconcile(&mut *session, &fetched, options)?;
    Ok(report)
}
