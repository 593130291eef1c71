/*!
Logging and profiling setup for the command-line tool.

Two implementations share one API:

- real: compiled when `feature = "profiling"` is set. Adds a `tracing-chrome`
  layer so every span (including the library's instrumented functions) ends up
  in a trace file that can be opened in Perfetto.
- stub: compiled in all other configurations; logging only.

Logs always go to stderr so that stdout stays clean JSON.
*/

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set
fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(feature = "profiling")]
mod inner {
    use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    /// Keeps the trace file open; dropping it flushes the trace
    pub struct LoggingGuard {
        _chrome: FlushGuard,
    }

    /// Initialize logging plus a chrome trace written to `./trace-<timestamp>.json`
    pub fn setup_logging_and_profiling() -> LoggingGuard {
        let (chrome_layer, guard) = ChromeLayerBuilder::new().include_args(true).build();
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(super::default_filter());

        tracing_subscriber::registry()
            .with(chrome_layer)
            .with(fmt_layer)
            .init();

        tracing::info!("Tracing initialized with chrome profiling layer");
        LoggingGuard { _chrome: guard }
    }
}

#[cfg(not(feature = "profiling"))]
mod inner {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    /// Nothing to flush without profiling
    pub struct LoggingGuard;

    /// Initialize logging with sensible defaults; profiling is a no-op here.
    pub fn setup_logging_and_profiling() -> LoggingGuard {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(super::default_filter());
        tracing_subscriber::registry().with(fmt_layer).init();

        tracing::debug!("Logging initialized (profiling disabled in this build)");
        LoggingGuard
    }
}

// Re-export a stable API surface regardless of which `inner` module was compiled.
pub use inner::{LoggingGuard, setup_logging_and_profiling};
