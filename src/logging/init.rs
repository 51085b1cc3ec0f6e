use std::sync::Once;

use log::LevelFilter;

/// Environment variable read before `RUST_LOG`.
pub const ENV_LOG: &str = "SOFTY_LOG";

/// Logger configuration.
///
/// `filter` uses the `env_logger` syntax, e.g. `"softy=trace"` to see the
/// per-frame stats. Without it `SOFTY_LOG`, then `RUST_LOG`, are consulted;
/// otherwise `softy` logs at `level` and every other crate at `warn`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub filter: Option<String>,
    pub level: LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: None,
            level: LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Filter for `level` on this crate with everything else at `warn`.
    pub fn crate_filter(&self) -> String {
        format!("warn,{}={}", env!("CARGO_CRATE_NAME"), self.level)
    }

    /// The filter string that wins, in order: explicit, `SOFTY_LOG`,
    /// `RUST_LOG`, [`crate_filter`](Self::crate_filter).
    fn resolve_filter(&self, softy_log: Option<String>, rust_log: Option<String>) -> String {
        self.filter
            .clone()
            .or(softy_log)
            .or(rust_log)
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| self.crate_filter())
    }
}

static INIT: Once = Once::new();

/// Installs the global logger on the first call; later calls do nothing.
///
/// A logger installed by someone else (a test harness, a host application)
/// is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(
            std::env::var(ENV_LOG).ok(),
            std::env::var("RUST_LOG").ok(),
        );

        let mut builder = env_logger::Builder::new();
        builder
            .parse_filters(&filter)
            .write_style(config.write_style)
            // Frame timings are easier to read with milliseconds.
            .format_timestamp_millis()
            .format_module_path(false);

        match builder.try_init() {
            Ok(()) => log::debug!("logging initialized with filter {filter:?}"),
            Err(e) => log::debug!("keeping existing logger: {e}"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_quiets_other_crates() {
        let config = LoggingConfig::default();
        assert_eq!(config.crate_filter(), "warn,softy=INFO");
        assert_eq!(config.resolve_filter(None, None), "warn,softy=INFO");
    }

    #[test]
    fn level_applies_to_this_crate_only() {
        let config = LoggingConfig {
            level: LevelFilter::Trace,
            ..LoggingConfig::default()
        };
        assert_eq!(config.resolve_filter(None, None), "warn,softy=TRACE");
    }

    #[test]
    fn explicit_filter_beats_environment() {
        let config = LoggingConfig {
            filter: Some("softy=debug".into()),
            ..LoggingConfig::default()
        };
        let resolved = config.resolve_filter(Some("error".into()), Some("trace".into()));
        assert_eq!(resolved, "softy=debug");
    }

    #[test]
    fn softy_log_beats_rust_log() {
        let config = LoggingConfig::default();
        assert_eq!(config.resolve_filter(Some("debug".into()), Some("trace".into())), "debug");
        assert_eq!(config.resolve_filter(None, Some("trace".into())), "trace");
    }

    #[test]
    fn blank_variables_fall_back() {
        let config = LoggingConfig::default();
        assert_eq!(config.resolve_filter(Some("  ".into()), None), "warn,softy=INFO");
    }
}
