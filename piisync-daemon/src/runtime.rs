use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio::time::Instant;
use tokio_cron_scheduler::{Job, JobScheduler};

use piisync_core::{config, ReconcileOptions, SyncConfig};
use piisync_source::{GithubContentSource, PatternSource};
use piisync_sync::{pipeline, PatternStore, ReconcileReport, SqlitePatternStore};

use crate::error::{io_err, DaemonError};
use crate::logging::init_tracing;

// ---------------------------------------------------------------------------
// Tick queue
// ---------------------------------------------------------------------------

/// A request to run one cycle.
#[derive(Debug)]
pub struct Tick {
    pub source: &'static str,
    pub queued_at: Instant,
}

/// Result of offering a tick to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOffer {
    Enqueued,
    /// A cycle is already waiting; this tick was dropped.
    Skipped,
    /// The worker has stopped.
    Closed,
}

/// Sending half of the single-slot cycle queue.
///
/// At most one tick waits behind the running cycle. Ticks arriving while
/// the slot is full are skipped, so cycles never overlap or pile up.
#[derive(Debug, Clone)]
pub struct TickQueue {
    tx: mpsc::Sender<Tick>,
}

impl TickQueue {
    pub fn channel() -> (Self, mpsc::Receiver<Tick>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { tx }, rx)
    }

    pub fn offer(&self, source: &'static str) -> TickOffer {
        let tick = Tick {
            source,
            queued_at: Instant::now(),
        };
        match self.tx.try_send(tick) {
            Ok(()) => TickOffer::Enqueued,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(source, "cycle already queued, skipping tick");
                TickOffer::Skipped
            }
            Err(TrySendError::Closed(_)) => TickOffer::Closed,
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Changed(ReconcileReport),
    Unchanged,
    Failed { kind: &'static str, message: String },
}

impl CycleOutcome {
    fn log(&self, elapsed: Duration) {
        let duration_ms = elapsed.as_millis() as u64;
        match self {
            CycleOutcome::Changed(report) => tracing::info!(
                deleted = report.deleted,
                created = report.created,
                updated = report.updated,
                duration_ms,
                "patterns fetched and stored",
            ),
            CycleOutcome::Unchanged => {
                tracing::warn!(duration_ms, "no changes detected, pattern table not updated")
            }
            CycleOutcome::Failed { kind, message } => tracing::error!(
                kind = *kind,
                error = %message,
                duration_ms,
                "error fetching and storing patterns",
            ),
        }
    }
}

struct CycleDeps<S, T> {
    source: S,
    store: T,
}

/// Owns the cycle's collaborators and runs cycles one at a time.
pub struct Orchestrator<S, T> {
    deps: Arc<Mutex<CycleDeps<S, T>>>,
    options: ReconcileOptions,
}

impl<S, T> Clone for Orchestrator<S, T> {
    fn clone(&self) -> Self {
        Self {
            deps: Arc::clone(&self.deps),
            options: self.options,
        }
    }
}

impl<S, T> Orchestrator<S, T>
where
    S: PatternSource + Send + 'static,
    T: PatternStore + Send + 'static,
{
    pub fn new(source: S, store: T, options: ReconcileOptions) -> Self {
        Self {
            deps: Arc::new(Mutex::new(CycleDeps { source, store })),
            options,
        }
    }

    /// Run one cycle on a blocking thread and log how it ended.
    ///
    /// Never returns an error: failures are logged and reported as
    /// [`CycleOutcome::Failed`] so the caller keeps ticking.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let started = Instant::now();
        let deps = Arc::clone(&self.deps);
        let options = self.options;

        let joined = tokio::task::spawn_blocking(move || {
            let mut guard = deps.blocking_lock();
            let CycleDeps { source, store } = &mut *guard;
            pipeline::run_cycle(&*source, store, options)
        })
        .await;

        let outcome = match joined {
            Ok(Ok(report)) if report.changed => CycleOutcome::Changed(report),
            Ok(Ok(_)) => CycleOutcome::Unchanged,
            Ok(Err(err)) => CycleOutcome::Failed {
                kind: err.kind(),
                message: err.to_string(),
            },
            Err(err) => CycleOutcome::Failed {
                kind: "panic",
                message: err.to_string(),
            },
        };
        outcome.log(started.elapsed());
        outcome
    }

    /// Borrow the collaborators between cycles.
    pub async fn inspect<R>(&self, f: impl FnOnce(&S, &T) -> R) -> R {
        let guard = self.deps.lock().await;
        f(&guard.source, &guard.store)
    }
}

// ---------------------------------------------------------------------------
// Worker + scheduler
// ---------------------------------------------------------------------------

/// Serve ticks until the queue closes or shutdown is signalled.
///
/// A cycle in progress always runs to completion before shutdown is seen.
pub async fn cycle_worker<S, T>(
    orchestrator: Orchestrator<S, T>,
    mut ticks: mpsc::Receiver<Tick>,
    mut shutdown_rx: broadcast::Receiver<()>,
) where
    S: PatternSource + Send + 'static,
    T: PatternStore + Send + 'static,
{
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            tick = ticks.recv() => {
                let Some(tick) = tick else { break };
                tracing::debug!(
                    source = tick.source,
                    waited_ms = tick.queued_at.elapsed().as_millis() as u64,
                    "cycle started",
                );
                orchestrator.run_cycle().await;
            }
        }
    }
}

async fn start_scheduler(expression: &str, queue: TickQueue) -> Result<JobScheduler, DaemonError> {
    let scheduler = JobScheduler::new().await?;
    let job = Job::new_async(expression, move |_uuid, _scheduler| {
        let queue = queue.clone();
        Box::pin(async move {
            if queue.offer("schedule") == TickOffer::Closed {
                tracing::warn!("cycle worker stopped, tick dropped");
            }
        })
    })?;
    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Run the scheduler and cycle worker until `shutdown` resolves.
///
/// `start_blocking` passes `tokio::signal::ctrl_c()`. A failed `shutdown`
/// still stops everything cleanly and is then returned as
/// [`DaemonError::Signal`].
pub async fn run<S, T, F>(
    orchestrator: Orchestrator<S, T>,
    schedule: &str,
    shutdown: F,
) -> Result<(), DaemonError>
where
    S: PatternSource + Send + 'static,
    T: PatternStore + Send + 'static,
    F: Future<Output = io::Result<()>>,
{
    let expression = config::normalize_schedule(schedule)?;
    let (queue, ticks) = TickQueue::channel();
    let (shutdown_tx, _) = broadcast::channel::<()>(4);

    let worker_handle = {
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(cycle_worker(orchestrator, ticks, shutdown_rx))
    };

    let mut scheduler = start_scheduler(&expression, queue).await?;
    tracing::info!(schedule, "scheduler started");

    let signal = shutdown.await;
    match &signal {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(err) => tracing::error!(error = %err, "shutdown signal failed, shutting down"),
    }

    scheduler.shutdown().await?;
    let _ = shutdown_tx.send(());
    worker_handle.await.map_err(|err| DaemonError::Join {
        task: "cycle_worker",
        message: err.to_string(),
    })?;

    signal.map_err(DaemonError::Signal)
}

/// Build the production collaborators from `config` and block until exit.
pub fn start_blocking(config: &SyncConfig, home: &Path) -> Result<(), DaemonError> {
    init_tracing();

    let source = GithubContentSource::new(&config.source);
    let store = SqlitePatternStore::new(
        config::database_path_at(home),
        config.store.busy_timeout(),
    );
    tracing::info!(
        source = %source.describe(),
        database = %store.path().display(),
        full_diff = config.reconcile.full_diff,
        "starting pattern sync",
    );
    let orchestrator = Orchestrator::new(source, store, config.reconcile);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(orchestrator, &config.schedule, tokio::signal::ctrl_c()))
}
