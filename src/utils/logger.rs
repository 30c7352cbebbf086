use crate::utils::error::{AppError, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::{
    fmt, fmt::time::ChronoLocal, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// HTTP stack targets that would otherwise log query strings and auth headers.
const QUIET_TARGETS: [&str; 4] = ["reqwest", "hyper", "hyper_util", "rustls"];

const FILE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Owns the per-run log file. Dropping or closing it flushes pending lines.
pub struct LogContext {
    log_file: PathBuf,
    guard: WorkerGuard,
}

impl LogContext {
    /// Installs the global subscriber: a verbose file layer under
    /// `<cache_dir>/logs` plus a compact stderr layer.
    pub fn init(cache_dir: &Path, prefix: &str, verbose: bool) -> Result<Self> {
        let log_dir = cache_dir.join("logs");
        std::fs::create_dir_all(&log_dir)?;

        let file_name = log_file_name(prefix, &chrono::Local::now().naive_local());
        let log_file = log_dir.join(&file_name);

        let appender = tracing_appender::rolling::never(&log_dir, &file_name);
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_timer(ChronoLocal::new(FILE_TIMESTAMP.to_string()))
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(build_filter("gitgatgotya=trace,debug")?);

        let console_default = if verbose {
            "gitgatgotya=debug,info"
        } else {
            "gitgatgotya=info,warn"
        };
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_filter(build_filter(console_default)?);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .map_err(|e| AppError::Logging {
                message: e.to_string(),
            })?;

        tracing::debug!("Logging to {}", log_file.display());
        Ok(Self { log_file, guard })
    }

    pub fn log_file(&self) -> &Path {
        &self.log_file
    }

    /// Flushes the file writer and ends the logging lifecycle.
    pub fn close(self) {
        tracing::debug!("Closing log file {}", self.log_file.display());
        drop(self.guard);
    }
}

/// `RUST_LOG` wins over `default`, but the HTTP stack stays capped at `warn`.
fn build_filter(default: &str) -> Result<EnvFilter> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    for target in QUIET_TARGETS {
        let directive: Directive =
            format!("{target}=warn")
                .parse()
                .map_err(|e: ParseError| AppError::Logging {
                    message: e.to_string(),
                })?;
        filter = filter.add_directive(directive);
    }

    Ok(filter)
}

pub fn log_file_name(prefix: &str, at: &NaiveDateTime) -> String {
    format!("{}_{}.log", prefix, at.format("%Y%m%d_%Hh%Mm%Ss"))
}
