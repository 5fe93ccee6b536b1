//! Console log format: `LEVEL DD-MM-YYYY HH:mm:ss AM: message key=value`.

use std::fmt;

use chrono::{DateTime, Local, TimeZone};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset. The scheduler crate logs its own
/// lifecycle at info.
pub const DEFAULT_FILTER: &str = "info,tokio_cron_scheduler=warn";

/// `DD-MM-YYYY HH:mm:ss A`.
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S %p";

/// Event formatter producing one `LEVEL TIMESTAMP: MESSAGE` line per event.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{}",
            line_prefix(event.metadata().level(), &Local::now())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// `"WARN 19-10-2026 14:03:05 PM: "` for the given level and time.
pub fn line_prefix<Tz>(level: &Level, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    format!("{} {}: ", level, at.format(TIMESTAMP_FORMAT))
}

/// Plain-text [`LineFormat`] subscriber writing to `make_writer`.
///
/// ANSI styling stays off so field keys render as bare `key=value` on a
/// terminal and in redirected output alike.
pub fn line_subscriber<W>(
    filter: EnvFilter,
    make_writer: W,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .event_format(LineFormat)
        .with_writer(make_writer)
        .finish()
}

/// Install the console subscriber. `RUST_LOG` overrides [`DEFAULT_FILTER`].
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = line_subscriber(filter, std::io::stdout).try_init();
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    use super::*;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn prefix_matches_console_layout() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 14, 3, 5).unwrap();
        assert_eq!(line_prefix(&Level::WARN, &at), "WARN 19-10-2026 14:03:05 PM: ");
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 9, 0, 0).unwrap();
        assert_eq!(line_prefix(&Level::ERROR, &at), "ERROR 02-01-2026 09:00:00 AM: ");
    }

    #[test]
    fn events_render_as_single_lines_with_fields() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = line_subscriber(EnvFilter::new("info"), move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(created = 2, "pattern table updated");
            tracing::warn!("no changes detected");
        });

        let output = buf.contents();
        assert!(!output.contains('\x1b'), "escape codes in output: {output:?}");
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2, "output was:\n{output}");
        assert!(lines[0].starts_with("INFO "), "line was: {}", lines[0]);
        assert!(
            lines[0].ends_with(": pattern table updated created=2"),
            "line was: {}",
            lines[0]
        );
        assert!(lines[1].starts_with("WARN "), "line was: {}", lines[1]);
        assert!(lines[1].ends_with(": no changes detected"), "line was: {}", lines[1]);
    }

    #[test]
    fn default_filter_quiets_scheduler_lifecycle() {
        let buf = SharedBuf::default();
        let writer = buf.clone();
        let subscriber = line_subscriber(EnvFilter::new(DEFAULT_FILTER), move || writer.clone());

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "tokio_cron_scheduler::job_scheduler", "Job creator created");
            tracing::warn!(target: "tokio_cron_scheduler::job_scheduler", "job store unavailable");
            tracing::info!(schedule = "*/1 * * * *", "scheduler started");
        });

        let output = buf.contents();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2, "output was:\n{output}");
        assert!(lines[0].ends_with(": job store unavailable"), "line was: {}", lines[0]);
        assert!(
            lines[1].ends_with(r#": scheduler started schedule="*/1 * * * *""#),
            "line was: {}",
            lines[1]
        );
    }
}
