//! Logging setup
//!
//! Logs go to the file named by `[app] log_file` at `[app] log_level`. With
//! `--verbose` they go to stderr at debug level instead. `TP_LOG` accepts
//! extra `tracing` filter directives on top of the configured level.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

use crate::core::config::{expand_home, ConfigError, FileConfig, Origin};

const APP_SECTION: &str = "app";

/// Environment variable with additional filter directives
pub const LOG_ENV: &str = "TP_LOG";

/// Where and how much to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub file: Option<PathBuf>,
    pub level: LevelFilter,
    pub compact: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            file: None,
            level: LevelFilter::WARN,
            compact: false,
        }
    }
}

impl LogSettings {
    /// Read the `[app]` section
    pub fn from_config(files: &FileConfig) -> Result<Self, ConfigError> {
        let file = files
            .get_non_empty(APP_SECTION, "log_file")
            .map(expand_home);

        let level = match files.get_non_empty(APP_SECTION, "log_level") {
            Some(raw) => parse_level(raw).ok_or_else(|| ConfigError::Coercion {
                option: "log_level".to_string(),
                value: raw.to_string(),
                expected: "one of debug, info, warning, error, critical",
                origin: Origin::Section(APP_SECTION.to_string()),
            })?,
            None => LevelFilter::WARN,
        };

        let compact = match files.get_non_empty(APP_SECTION, "log_format") {
            None => false,
            Some(raw) if raw.eq_ignore_ascii_case("full") => false,
            Some(raw) if raw.eq_ignore_ascii_case("compact") => true,
            Some(raw) => {
                return Err(ConfigError::Coercion {
                    option: "log_format".to_string(),
                    value: raw.to_string(),
                    expected: "full or compact",
                    origin: Origin::Section(APP_SECTION.to_string()),
                })
            }
        };

        Ok(Self {
            file,
            level,
            compact,
        })
    }
}

/// Map a configured level name to a tracing level
pub fn parse_level(raw: &str) -> Option<LevelFilter> {
    match raw.trim().to_lowercase().as_str() {
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warning" | "warn" => Some(LevelFilter::WARN),
        "error" | "critical" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

/// Install the global subscriber
///
/// Does nothing when a subscriber is already installed. A log file that
/// cannot be opened disables logging rather than failing the command.
pub fn init(settings: &LogSettings, verbose: bool) {
    let (level, writer, ansi) = if verbose {
        (LevelFilter::DEBUG, BoxMakeWriter::new(std::io::stderr), true)
    } else {
        match settings.file.as_deref().and_then(open_log_file) {
            Some(file) => (settings.level, BoxMakeWriter::new(Mutex::new(file)), false),
            None => (LevelFilter::OFF, BoxMakeWriter::new(std::io::sink), false),
        }
    };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false);

    let installed = if settings.compact {
        builder.compact().try_init()
    } else {
        builder.try_init()
    };

    if installed.is_ok() {
        tracing::debug!(?level, file = ?settings.file, "logging initialized");
    }
}

fn open_log_file(path: &Path) -> Option<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(ini: &str) -> Result<LogSettings, ConfigError> {
        LogSettings::from_config(&FileConfig::from_ini(ini, "test.conf").unwrap())
    }

    #[test]
    fn test_levels() {
        assert_eq!(parse_level("DEBUG"), Some(LevelFilter::DEBUG));
        assert_eq!(parse_level("warning"), Some(LevelFilter::WARN));
        assert_eq!(parse_level("critical"), Some(LevelFilter::ERROR));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_settings_from_app_section() {
        let parsed = settings("[app]\nlog_file = /tmp/tp.log\nlog_level = info\nlog_format = compact\n")
            .unwrap();

        assert_eq!(parsed.file, Some(PathBuf::from("/tmp/tp.log")));
        assert_eq!(parsed.level, LevelFilter::INFO);
        assert!(parsed.compact);
    }

    #[test]
    fn test_empty_app_section_uses_defaults() {
        assert_eq!(settings("[app]\nlog_file =\n").unwrap(), LogSettings::default());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            settings("[app]\nlog_level = loud\n"),
            Err(ConfigError::Coercion { .. })
        ));
        assert!(matches!(
            settings("[app]\nlog_format = xml\n"),
            Err(ConfigError::Coercion { .. })
        ));
    }
}
