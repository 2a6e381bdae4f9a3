use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";

/// Install the global subscriber: human-readable console output plus a
/// daily-rolling JSON file under `logs/` for later inspection.
pub fn init_logging() {
    let _ = fs::create_dir_all(LOG_DIR);

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, "ingest.log"));

    let filter = EnvFilter::from_default_env()
        .add_directive("urnavi_ingest=info".parse().expect("valid directive"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    // The appender guard must outlive the process or buffered lines are
    // lost on exit; leak it rather than threading it through main.
    std::mem::forget(guard);
}
