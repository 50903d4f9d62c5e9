use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_error::ErrorLayer;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LOG_ENV, LOG_FILE, get_data_dir};

/// File-only tracing. Nothing may write to stdout while the alternate
/// screen is up, so there is no console layer; the returned guard must stay
/// alive for the log worker to flush.
pub fn init(default_level: &str) -> Result<WorkerGuard> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory)?;

    let file_appender = tracing_appender::rolling::never(&directory, LOG_FILE.clone());
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_env(LOG_ENV.clone())
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let file_layer = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(ErrorLayer::default())
        .init();

    Ok(guard)
}
