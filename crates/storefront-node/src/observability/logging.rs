//! Structured logging initialization.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format (for development).
    #[default]
    Pretty,
    /// JSON format (for production log aggregation).
    Json,
}

impl LogFormat {
    /// Parse log format from string.
    ///
    /// Anything other than `json` selects [`LogFormat::Pretty`].
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    /// Name used in configuration files.
    pub fn as_str(self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

/// Builds the default filter directives for `level`.
fn default_directives(level: &str) -> String {
    format!("storefront={level},tower_http=debug,axum::rejection=trace")
}

/// Initialize the logging system.
///
/// `RUST_LOG` takes precedence over `level` when set. Must be called at
/// most once per process.
///
/// # Example
///
/// ```rust,no_run
/// use storefront_node::observability::{init_logging, LogFormat};
///
/// init_logging("info", LogFormat::Json);
/// ```
pub fn init_logging(level: &str, format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives(level).into());

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true),
            )
            .init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
    }

    tracing::info!(level = %level, format = format.as_str(), "Logging initialized");
}
