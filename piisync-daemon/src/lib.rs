//! Scheduled sync runtime: cron ticks → serialized cycle worker.

mod error;
pub mod logging;
mod runtime;

pub use error::DaemonError;
pub use logging::{init_tracing, line_subscriber, LineFormat, DEFAULT_FILTER};
pub use runtime::{
    cycle_worker, run, start_blocking, CycleOutcome, Orchestrator, Tick, TickOffer, TickQueue,
};
