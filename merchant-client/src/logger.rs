//! Logging setup
//!
//! Console logging plus optional daily rotating files:
//! - `app/`: everything except user notifications (kept 14 days)
//! - `notification/`: every toast shown to the merchant (kept 14 days)

use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, prelude::*};

/// Days a rotated log file is kept
pub const LOG_RETENTION_DAYS: i64 = 14;

const LOG_KINDS: [&str; 2] = ["app", "notification"];

/// Delete rotated log files older than [`LOG_RETENTION_DAYS`]
///
/// Returns the number of deleted files.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(LOG_RETENTION_DAYS);
    let mut deleted = 0;

    for kind in LOG_KINDS {
        let dir = log_dir.join(kind);
        if !dir.exists() {
            continue;
        }
        let prefix = format!("{}.", kind);

        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            // RollingFileAppender names files `<prefix>.YYYY-MM-DD`
            if let Some(name) = path.file_name().and_then(|n| n.to_str())
                && let Some(date_part) = name.strip_prefix(&prefix)
                && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                && date < cutoff
            {
                fs::remove_file(&path)?;
                deleted += 1;
                tracing::info!(file = %name, "Deleted old log file");
            }
        }
    }

    Ok(deleted)
}

/// Initialize logging
///
/// # Arguments
/// * `level` - default filter when `RUST_LOG` is unset (e.g. "info")
/// * `json_format` - JSON lines instead of the human readable format
/// * `log_dir` - also write rotated files under this directory
///
/// # Examples
/// ```no_run
/// use merchant_client::logger::init_logger_with_file;
///
/// // 开发环境：只输出到控制台
/// init_logger_with_file("debug", false, None)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&str>,
) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let mut layers = vec![console_layer];

    if let Some(dir) = log_dir {
        let log_dir = Path::new(dir);
        for kind in LOG_KINDS {
            fs::create_dir_all(log_dir.join(kind))?;
        }
        cleanup_old_logs(log_dir)?;

        let app_log = RollingFileAppender::new(Rotation::DAILY, log_dir.join("app"), "app");
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(std::sync::Mutex::new(app_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != "notification"
                }))
                .boxed(),
        );

        let notification_log = RollingFileAppender::new(
            Rotation::DAILY,
            log_dir.join("notification"),
            "notification",
        );
        layers.push(
            fmt::layer()
                .json()
                .with_writer(std::sync::Mutex::new(notification_log))
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == "notification"
                }))
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()?;

    Ok(())
}

/// Initialize console-only logging
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<()> {
    init_logger_with_file(level, json_format, None)
}
