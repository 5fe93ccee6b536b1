use std::time::Duration;

use tempfile::TempDir;
use tokio::sync::broadcast;

use piisync_core::{PatternRecord, ReconcileOptions};
use piisync_daemon::{cycle_worker, Orchestrator, TickOffer, TickQueue};
use piisync_source::StaticSource;
use piisync_sync::{PatternStore, SqlitePatternStore};

fn sqlite_store(dir: &TempDir) -> SqlitePatternStore {
    SqlitePatternStore::new(dir.path().join("patterns.db"), Duration::from_secs(1))
}

fn names(store: &mut SqlitePatternStore) -> Vec<String> {
    let mut names: Vec<String> = store
        .find_many()
        .expect("find_many")
        .into_iter()
        .map(|p| p.record.name.to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn queued_tick_runs_a_cycle_against_sqlite() {
    let dir = TempDir::new().expect("tempdir");
    let source = StaticSource::Records(vec![
        PatternRecord::new("email", r"[^@]+@[^@]+", true, false),
        PatternRecord::new("phone", r"\d{10}", true, true),
    ]);
    let orchestrator = Orchestrator::new(source, sqlite_store(&dir), ReconcileOptions::default());

    let (queue, ticks) = TickQueue::channel();
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let worker = tokio::spawn(cycle_worker(orchestrator.clone(), ticks, shutdown_rx));

    assert_eq!(queue.offer("test"), TickOffer::Enqueued);
    // Closing the queue lets the worker drain the tick and exit.
    drop(queue);
    tokio::time::timeout(Duration::from_secs(10), worker)
        .await
        .expect("worker finished")
        .expect("worker did not panic");
    drop(shutdown_tx);

    let connected = orchestrator.inspect(|_, store| store.is_connected()).await;
    assert!(!connected, "cycle must release its connection");

    let mut reader = sqlite_store(&dir);
    assert_eq!(names(&mut reader), vec!["email", "phone"]);
}

#[tokio::test]
async fn shutdown_stops_an_idle_worker() {
    let dir = TempDir::new().expect("tempdir");
    let orchestrator = Orchestrator::new(
        StaticSource::Records(Vec::new()),
        sqlite_store(&dir),
        ReconcileOptions::default(),
    );

    let (_queue, ticks) = TickQueue::channel();
    let (shutdown_tx, shutdown_rx) = broadcast::channel::<()>(1);
    let worker = tokio::spawn(cycle_worker(orchestrator, ticks, shutdown_rx));

    shutdown_tx.send(()).expect("worker subscribed");
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker stopped")
        .expect("worker did not panic");

    assert!(!dir.path().join("patterns.db").exists(), "no cycle ran");
}
