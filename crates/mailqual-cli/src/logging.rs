//! Logging setup: verbosity-derived level filter, optional JSON format,
//! `RUST_LOG` override. A deliberately smaller cousin of the teacher's
//! `sdtm_cli::logging::LogConfig`/`init_logging` (which also supports a
//! log-file sink and a hand-rolled human formatter); this CLI only ever
//! logs to stderr, so that machinery is dropped rather than carried along
//! unused.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    pub format: LogFormat,
}

impl LogConfig {
    pub fn from_level_filter(level_filter: LevelFilter, json: bool) -> Self {
        Self {
            level_filter,
            format: if json { LogFormat::Json } else { LogFormat::Pretty },
        }
    }
}

/// `RUST_LOG` always wins over `-v`/`-q` when set, matching the teacher's
/// `build_env_filter` precedence.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level_filter.to_string()));

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match config.format {
        LogFormat::Pretty => subscriber.compact().init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_selects_json_format() {
        let config = LogConfig::from_level_filter(LevelFilter::DEBUG, true);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level_filter, LevelFilter::DEBUG);
    }

    #[test]
    fn default_format_is_pretty() {
        let config = LogConfig::from_level_filter(LevelFilter::WARN, false);
        assert_eq!(config.format, LogFormat::Pretty);
    }
}
