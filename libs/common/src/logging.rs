//! Unified logging module for the alerting services
//!
//! Console logging via tracing with a compact bracketed-level format
//! and runtime-reloadable filter level.

use std::sync::{Mutex, OnceLock};

use tracing::Level;
use tracing_subscriber::{
    fmt::{
        format::{FormatFields, Writer},
        FmtContext, FormatEvent,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Custom format for log level with brackets: `[INFO]`, `[WARN]`, etc.
fn format_level(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "[TRACE]",
        Level::DEBUG => "[DEBUG]",
        Level::INFO => "[INFO]",
        Level::WARN => "[WARN]",
        Level::ERROR => "[ERROR]",
    }
}

/// Custom event formatter that outputs: `timestamp [LEVEL] message`
///
/// Example output: `2025-12-02T00:50:44.809Z [INFO] Service started`
struct BracketedLevelFormat;

impl<S, N> FormatEvent<S, N> for BracketedLevelFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        // Format timestamp
        let now = chrono::Utc::now();
        write!(writer, "{} ", now.format("%Y-%m-%dT%H:%M:%S%.6fZ"))?;

        // Format level with brackets and color
        let level = *event.metadata().level();
        if writer.has_ansi_escapes() {
            let color = match level {
                Level::TRACE => "\x1b[35m", // magenta
                Level::DEBUG => "\x1b[34m", // blue
                Level::INFO => "\x1b[32m",  // green
                Level::WARN => "\x1b[33m",  // yellow
                Level::ERROR => "\x1b[31m", // red
            };
            write!(writer, "{}{}\x1b[0m ", color, format_level(&level))?;
        } else {
            write!(writer, "{} ", format_level(&level))?;
        }

        // Format the event message and fields
        ctx.field_format().format_fields(writer.by_ref(), event)?;

        writeln!(writer)
    }
}

/// Reload handle for changing the filter level at runtime
static LOG_FILTER_HANDLE: OnceLock<
    reload::Handle<EnvFilter, tracing_subscriber::Registry>,
> = OnceLock::new();

/// Currently active filter spec, for reporting on the config surface
static CURRENT_LOG_LEVEL: OnceLock<Mutex<String>> = OnceLock::new();

/// Initialize logging with the given default level
///
/// The `RUST_LOG` environment variable wins over the `level` argument
/// when set. Calling this twice is an error (the global subscriber can
/// only be installed once).
pub fn init(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let (filter_layer, handle) = reload::Layer::new(filter);

    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(BracketedLevelFormat)
        .boxed();

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    let _ = LOG_FILTER_HANDLE.set(handle);
    let _ = CURRENT_LOG_LEVEL.set(Mutex::new(level.to_string()));

    Ok(())
}

/// Dynamically set log filter level at runtime
///
/// Accepts a plain level (`"debug"`) or a full filter spec
/// (`"info,escsrv=debug"`).
pub fn set_log_level(level: &str) -> Result<(), String> {
    let handle = LOG_FILTER_HANDLE
        .get()
        .ok_or("Logging not initialized with reload support")?;

    let new_filter =
        EnvFilter::try_new(level).map_err(|e| format!("Invalid log level '{}': {}", level, e))?;

    handle
        .reload(new_filter)
        .map_err(|e| format!("Failed to reload log filter: {}", e))?;

    if let Some(current) = CURRENT_LOG_LEVEL.get() {
        if let Ok(mut guard) = current.lock() {
            *guard = level.to_string();
        }
    }

    tracing::info!("Log level changed to: {}", level);
    Ok(())
}

/// Axum middleware that logs every request with its status and latency
///
/// Attach with `.layer(axum::middleware::from_fn(http_request_logger))`
/// before `.with_state()`.
#[cfg(feature = "axum")]
pub async fn http_request_logger(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    if status.is_server_error() {
        tracing::error!("{} {} -> {} ({:?})", method, uri, status.as_u16(), elapsed);
    } else if status.is_client_error() {
        tracing::warn!("{} {} -> {} ({:?})", method, uri, status.as_u16(), elapsed);
    } else {
        tracing::info!("{} {} -> {} ({:?})", method, uri, status.as_u16(), elapsed);
    }
    response
}

/// Get current log filter level
pub fn get_log_level() -> String {
    CURRENT_LOG_LEVEL
        .get()
        .and_then(|m| m.lock().ok())
        .map(|guard| guard.clone())
        .unwrap_or_else(|| "unknown".to_string())
}
