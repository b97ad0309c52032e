//! Logging infrastructure
//!
//! Structured logging through `tracing`, with pretty/compact/JSON output to
//! stdout, stderr, or a daily-rotated file.

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with timestamps
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Log output destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    /// File with daily rotation
    File { directory: String, prefix: String },
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Emit span open/close events
    pub span_events: bool,
    /// Extra filter directives, e.g. "smartpy=debug,smartpy_runtime=trace"
    pub filter: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            output: LogOutput::Stderr,
            span_events: false,
            filter: None,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// Parse a level name (`trace` .. `error`), case-insensitive
pub fn parse_level(name: &str) -> Option<Level> {
    match name.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

static INITIALIZED: OnceCell<()> = OnceCell::new();
static GLOBAL_GUARD: Mutex<Option<WorkerGuard>> = parking_lot::const_mutex(None);

/// Install the global subscriber.
///
/// Returns the writer guard; logs are flushed when it is dropped. Returns
/// `None` if a subscriber was already installed.
pub fn init_logging(config: LogConfig) -> Option<WorkerGuard> {
    let mut guard = None;

    INITIALIZED.get_or_init(|| {
        let filter = build_filter(&config);
        let span_events = span_events_config(config.span_events);

        let (layer, worker) = match &config.output {
            LogOutput::Stdout => {
                let (writer, worker) = tracing_appender::non_blocking(std::io::stdout());
                (format_layer(writer, config.format, span_events), worker)
            }
            LogOutput::Stderr => {
                let (writer, worker) = tracing_appender::non_blocking(std::io::stderr());
                (format_layer(writer, config.format, span_events), worker)
            }
            LogOutput::File { directory, prefix } => {
                let appender = rolling::daily(directory, prefix);
                let (writer, worker) = tracing_appender::non_blocking(appender);
                (format_layer(writer, config.format, span_events), worker)
            }
        };

        if tracing_subscriber::registry()
            .with(layer.with_filter(filter))
            .try_init()
            .is_ok()
        {
            guard = Some(worker);
        }
    });

    guard
}

/// Install the global subscriber and keep its guard until `shutdown`.
///
/// Returns `false` if logging was already initialised.
pub fn init_global(config: LogConfig) -> bool {
    match init_logging(config) {
        Some(guard) => {
            *GLOBAL_GUARD.lock() = Some(guard);
            true
        }
        None => false,
    }
}

/// Flush and drop the guard kept by `init_global`
pub fn shutdown() {
    GLOBAL_GUARD.lock().take();
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer<W>(writer: W, format: LogFormat, span_events: FmtSpan) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_span_events(span_events);

    match format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

fn build_filter(config: &LogConfig) -> EnvFilter {
    let base_filter = EnvFilter::from_default_env().add_directive(config.level.into());

    match &config.filter {
        Some(filter_str) => filter_str.split(',').fold(base_filter, |filter, directive| {
            filter.add_directive(directive.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Invalid filter directive: {}", directive);
                config.level.into()
            }))
        }),
        None => base_filter,
    }
}

fn span_events_config(enabled: bool) -> FmtSpan {
    if enabled {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = LogConfig::new()
            .with_level(Level::DEBUG)
            .with_format(LogFormat::Json)
            .with_span_events(true)
            .with_filter("smartpy=trace");

        assert_eq!(config.level, Level::DEBUG);
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.span_events);
        assert_eq!(config.filter, Some("smartpy=trace".to_string()));
        assert_eq!(config.output, LogOutput::Stderr);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("WARN"), Some(Level::WARN));
        assert_eq!(parse_level("trace"), Some(Level::TRACE));
        assert_eq!(parse_level("verbose"), None);
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init_global(LogConfig::new().with_level(Level::ERROR));
        let second = init_global(LogConfig::new());

        // Only one subscriber per process, whoever got there first
        assert!(!second);
        let _ = first;
        shutdown();
    }
}
