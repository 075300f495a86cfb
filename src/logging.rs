use std::path::Path;

use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, LoggingConfig};

/// File name prefix of the daily error log, e.g. `errors.2024-05-01.log`
pub const ERROR_LOG_PREFIX: &str = "errors";

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured filter when set. The returned guard
/// flushes the error log file and must live until shutdown.
pub fn init_tracing(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().boxed(),
    };

    let (error_layer, guard) = match &config.error_log_dir {
        Some(dir) => {
            let (layer, guard) = error_file_layer(dir)?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(error_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(guard)
}

/// JSON lines of ERROR events, rotated daily under `dir`.
///
/// Application errors carry `error_id` and `error_code` fields, so a client
/// report can be matched against this file.
fn error_file_layer<S>(dir: &Path) -> Result<(Box<dyn Layer<S> + Send + Sync>, WorkerGuard)>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(ERROR_LOG_PREFIX)
        .filename_suffix("log")
        .build(dir)
        .context("Failed to open the error log file")?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let layer = tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(false)
        .with_writer(writer)
        .with_filter(LevelFilter::ERROR)
        .boxed();

    Ok((layer, guard))
}
