use chrono::Local;
use std::fmt;
use tracing::{Event, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields},
    prelude::*,
    registry::LookupSpan,
    Layer,
};

/// Keeps the non-blocking appender threads alive. Drop this and the tail of
/// the log is lost; `main` must hold it for the whole run.
pub struct LoggerGuards {
    _app: WorkerGuard,
    _error: WorkerGuard,
}

/// Installs the global subscriber: everything at INFO and above goes to a
/// daily-rolled app log, errors additionally to their own file. There is no
/// console layer -- the terminal is reserved for the progress bar and the
/// fatal startup/summary prints.
pub fn setup_logger(logs_dir: &str) -> Option<LoggerGuards> {
    std::fs::create_dir_all(logs_dir).ok();

    let app_appender = tracing_appender::rolling::daily(logs_dir, "ronin-checker.log");
    let (app_writer, app_guard) = tracing_appender::non_blocking(app_appender);

    let error_appender = tracing_appender::rolling::daily(logs_dir, "error.log");
    let (error_writer, error_guard) = tracing_appender::non_blocking(error_appender);

    let app_layer = tracing_subscriber::fmt::layer()
        .with_writer(app_writer)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(tracing_subscriber::filter::LevelFilter::INFO);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_writer)
        .with_ansi(false)
        .event_format(FileFormatter)
        .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

    tracing_subscriber::registry()
        .with(app_layer)
        .with(error_layer)
        .try_init()
        .ok()?;

    Some(LoggerGuards {
        _app: app_guard,
        _error: error_guard,
    })
}

// --- Formatter ---

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let level = event.metadata().level();

        write!(writer, "{} [{}] ", timestamp, level)?;

        let mut msg_visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut msg_visitor);
        writeln!(writer, "{}", msg_visitor.message)
    }
}
