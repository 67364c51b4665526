//! Logging configuration.
//!
//! Verbosity is an explicit value built once from the command line and handed
//! to whatever needs it, rather than a process-wide debug level that
//! components consult on their own.

use log::LevelFilter;

/// How much diagnostic output to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LevelFilter,
}

impl LogConfig {
    /// `--verbose` enables debug output; otherwise only warnings and errors.
    pub fn from_verbose(verbose: bool) -> Self {
        Self {
            level: if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Warn
            },
        }
    }

    /// Whether external command output should be streamed to the terminal.
    pub fn show_command_output(&self) -> bool {
        self.level >= LevelFilter::Debug
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_verbose(false)
    }
}

/// Installs the `env_logger` backend.
///
/// `RUST_LOG` is applied on top of the configured level, so
/// `RUST_LOG=manifest_sync=trace` still works without `--verbose`.
/// Calling this twice is harmless; the second call is ignored.
pub fn init(config: &LogConfig) {
    let result = env_logger::Builder::new()
        .filter_level(config.level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialized");
    }
}
