//! Tracing subscriber for the `civmap` binary and the crate's tests.
//!
//! What the map core emits, by level:
//!
//! | level   | events                                                        |
//! |---------|---------------------------------------------------------------|
//! | `warn`  | geocoder failures, map surfaces that could not be created     |
//! | `info`  | report submitted, status changed, report removed, config file |
//! | `debug` | viewport transitions, re-centering, placemark redraws         |
//! | `trace` | settle reports from the surface, headless dimming toggles     |
//!
//! Each process writes `civmap-<pid>.log` under `<data_local_dir>/civmap/logs`
//! unless `--log-file` names another file or directory. The file only takes
//! `warn` and above until a filter is requested through `CIVMAP_LOG` (a bare
//! level applies to the three civmap crates) or `RUST_LOG`; either variable
//! also turns on terminal output, which debug builds always have.

use std::{
    env,
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

/// Crates whose events are raised to the requested level by `CIVMAP_LOG`.
const CIVMAP_CRATES: &[&str] = &["civmap", "civmap_bin", "civmap_log"];

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Returned from [`init`]; must be held alive to ensure log file flushing.
pub struct LogGuard {
    _file_guard: WorkerGuard,
    pub log_file: PathBuf,
}

#[derive(Debug, Default)]
pub struct LogConfig {
    pub log_file_path: Option<PathBuf>,
}

/// Install the file layer and, when requested, the terminal layer.
///
/// Keep the [`LogGuard`] until exit: the file is written from a background
/// worker that flushes when the guard drops. Fails if a global subscriber is
/// already installed.
pub fn init(config: LogConfig) -> Result<LogGuard, BoxError> {
    let (log_dir, filename) = resolve_log_path(config.log_file_path);

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::never(&log_dir, &filename);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(create_file_filter()?);

    let stdout_layer = if filter_requested() || cfg!(debug_assertions) {
        Some(fmt::layer().with_filter(create_filter()?))
    } else {
        None
    };

    Registry::default()
        .with(file_layer)
        .with(stdout_layer)
        .try_init()?;

    Ok(LogGuard {
        _file_guard: file_guard,
        log_file: log_dir.join(filename),
    })
}

/// Route events to the test harness's captured output.
///
/// Every test may call this; only the first call in a process installs
/// anything.
pub fn test() {
    if let Ok(filter) = create_filter() {
        let _ = fmt().with_env_filter(filter).with_test_writer().try_init();
    }
}

/// Split an optional override into `(directory, filename)`.
///
/// A path with an extension names the log file itself; anything else is a directory.
fn resolve_log_path(override_path: Option<PathBuf>) -> (PathBuf, String) {
    let filename = format!("civmap-{}.log", std::process::id());

    if let Some(path) = override_path {
        if path.extension().is_some() {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(filename);
            return (dir.to_path_buf(), name);
        }
        return (path, filename);
    }

    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("civmap")
        .join("logs");

    (dir, filename)
}

fn filter_requested() -> bool {
    env::var_os("CIVMAP_LOG").is_some() || env::var_os("RUST_LOG").is_some()
}

fn create_file_filter() -> Result<EnvFilter, BoxError> {
    if filter_requested() {
        create_filter()
    } else {
        Ok(EnvFilter::new("warn"))
    }
}

fn create_filter() -> Result<EnvFilter, BoxError> {
    if let Ok(civmap_log) = env::var("CIVMAP_LOG") {
        return Ok(EnvFilter::new(expand_civmap_log(&civmap_log)));
    }

    if let Ok(rust_log) = env::var("RUST_LOG") {
        return Ok(EnvFilter::new(rust_log));
    }

    Ok(EnvFilter::new(expand_civmap_log("info")))
}

/// Expand a `CIVMAP_LOG` value into a full filter directive.
///
/// - `CIVMAP_LOG=debug` becomes `warn,civmap=debug,civmap_bin=debug,civmap_log=debug`
/// - `CIVMAP_LOG=civmap=trace` is used as-is (advanced syntax)
fn expand_civmap_log(level: &str) -> String {
    if level.contains('=') || level.contains(':') || level.contains(',') {
        return level.to_string();
    }

    let mut directive = String::from("warn");
    for krate in CIVMAP_CRATES {
        directive.push(',');
        directive.push_str(krate);
        directive.push('=');
        directive.push_str(level);
    }
    directive
}
