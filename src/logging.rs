use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. When a log directory is set and
/// writable, a daily-rotated `robinhood.log` is written there as well; keep the
/// returned guard alive for as long as file logging should flush. Calling this
/// again after a subscriber is installed is a no-op.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(format!("{},robinhood=debug", config.level))
            .unwrap_or_else(|_| EnvFilter::new("info,robinhood=debug"))
    });

    let (file_layer, guard) = match config.dir.as_deref().map(prepare_log_dir) {
        Some(Ok(dir)) => {
            let appender = tracing_appender::rolling::daily(&dir, "robinhood.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        Some(Err(e)) => {
            eprintln!("Warning: file logging disabled: {}", e);
            (None, None)
        }
        None => (None, None),
    };

    let json_layer = config
        .json
        .then(|| tracing_subscriber::fmt::layer().json().with_target(true));
    let console_layer = (!config.json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
    });

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if installed {
        guard
    } else {
        None
    }
}

/// `rolling::daily` panics if it cannot create its file, so check writability first
fn prepare_log_dir(dir: &str) -> std::io::Result<String> {
    std::fs::create_dir_all(dir)?;
    let probe = std::path::Path::new(dir).join(".robinhood_write_test");
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&probe)?;
    let _ = std::fs::remove_file(&probe);
    Ok(dir.to_string())
}
