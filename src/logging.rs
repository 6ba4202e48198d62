use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Route tracing output to daily rolling files under `log_dir`.
///
/// The terminal belongs to the UI, so nothing is ever written to
/// stdout/stderr. Calling this twice returns an error from the second call.
pub fn init(level: &str, log_dir: &Path) -> Result<(), String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|err| format!("failed to create log directory `{}`: {err}", log_dir.display()))?;

    let filter = EnvFilter::try_new(level)
        .map_err(|err| format!("invalid log level `{level}`: {err}"))?;

    let file_appender = tracing_appender::rolling::daily(log_dir, "remindme.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(non_blocking)
        .try_init()
        .map_err(|err| err.to_string())?;

    let _ = LOG_GUARD.set(guard);
    Ok(())
}
