use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "info,hf_hub=warn,reqwest=warn,hyper_util=warn,candle_transformers=error";

/// Install the global subscriber: stderr always, plus a daily rolling file under `log_dir`.
///
/// Keep the returned guard alive for the life of the process or buffered file logs are lost.
pub fn init_tracing(log_dir: Option<&Path>) -> std::io::Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, "lookalike-prime.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init();

    Ok(guard)
}

pub fn init_tracing_tests(level: Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},hf_hub=error,reqwest=error")));

    // try_init: several tests in one binary may race to install a subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .without_time()
                .with_line_number(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_test_writer(),
        )
        .try_init();
}
