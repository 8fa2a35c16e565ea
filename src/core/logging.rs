use crate::shared::paths::ensure_dir;
use std::path::Path;
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Targets with their own log file. Everything else goes to `system.log`.
const ROUTED_TARGETS: [&str; 2] = ["tasks", "storage"];

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create logs directory: {0}")]
    Directory(#[from] std::io::Error),
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Keeps the background writers alive. Dropping it flushes and stops them.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

struct TargetWriter {
    routes: Vec<(&'static str, NonBlocking)>,
    system_writer: NonBlocking,
}

/// Returns the routed target `target` belongs to, matching whole path
/// segments (`tasks::reorder` belongs to `tasks`, `tasksx` does not).
fn route_for(target: &str) -> Option<&'static str> {
    ROUTED_TARGETS.iter().copied().find(|name| {
        target == *name
            || target
                .strip_prefix(*name)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

impl<'a> MakeWriter<'a> for TargetWriter {
    type Writer = NonBlocking;

    fn make_writer(&'a self) -> Self::Writer {
        self.system_writer.clone()
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        let writer = route_for(meta.target()).and_then(|name| {
            self.routes
                .iter()
                .find(|(route, _)| *route == name)
                .map(|(_, writer)| writer.clone())
        });

        writer.unwrap_or_else(|| self.system_writer.clone())
    }
}

/// Installs the global subscriber writing daily-rotated files into
/// `log_dir`. `RUST_LOG` takes precedence over `default_filter`.
pub fn init_logging(log_dir: &Path, default_filter: &str) -> Result<LoggingGuards, LoggingError> {
    ensure_dir(log_dir)?;

    let mut guards = Vec::new();
    let mut routes = Vec::new();

    for target in ROUTED_TARGETS {
        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{}.log", target));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        routes.push((target, non_blocking));
        guards.push(guard);
    }

    let system_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "system.log");
    let (system_writer, system_guard) = tracing_appender::non_blocking(system_appender);
    guards.push(system_guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(TargetWriter {
                routes,
                system_writer,
            })
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    Ok(LoggingGuards { _guards: guards })
}
