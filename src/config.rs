//! Process-level settings shared by every subcommand.
//!
//! Values come from command-line flags, falling back to environment
//! variables, then to defaults.

use std::path::PathBuf;

/// Default log filter when neither `--log-level` nor `YOLOCLS_LOG` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where and how much to log.
#[derive(clap::Args, Clone, Debug)]
pub struct LogSettings {
    /// Log filter directive, e.g. 'warn' or 'yolocls=debug'.
    #[arg(long = "log-level", global = true, env = "YOLOCLS_LOG", default_value = DEFAULT_LOG_LEVEL)]
    pub level: String,

    /// Also append log records to this file (UTF-8, no colors).
    #[arg(long = "log-file", global = true, env = "YOLOCLS_LOG_FILE")]
    pub file: Option<PathBuf>,

    /// Disable ANSI colors on stderr.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
            no_color: false,
        }
    }
}
