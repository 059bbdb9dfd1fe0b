use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const LOG_ENV: &str = "KOIDUMP_LOG";
const LOG_DIR_ENV: &str = "KOIDUMP_LOG_DIR";
const LOG_FILE_NAME: &str = "koidump.log";
const DEFAULT_FILTER: &str = "koidump=info,sqlx=warn";

static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the JSON subscriber on stderr, plus a daily rolling file when
/// `KOIDUMP_LOG_DIR` is set. Stdout is left to dump output. Calling this more
/// than once is harmless.
pub fn init_logging() {
    let _ = tracing_log::LogTracer::init();

    let stderr_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .with_filter(env_filter());

    let file_layer = std::env::var_os(LOG_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map(|dir| {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            fmt::layer()
                .json()
                .with_target(true)
                .with_ansi(false)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(writer)
                .with_filter(env_filter())
        });

    let _ = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}
