//! File and command line configuration.

use crate::display::DisplayConfig;
use crate::feed::FeedSource;
use clap::Parser;
use serde::Deserialize;
use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use toml::de;

/// Errors raised while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The config file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Parse(#[from] de::Error),
    /// A value is out of range.
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Command line arguments. Values given here override the config file.
#[derive(Debug, Parser)]
#[command(version, about = "Tail a remote text feed in the terminal")]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "text-feed.toml")]
    pub config: PathBuf,
    /// Address to fetch, overrides `feed.base_url` and `feed.path`
    #[arg(long)]
    pub url: Option<String>,
    /// Show only the latest payload in a scrolling panel
    #[arg(long)]
    pub panel: bool,
    /// Number of rows kept in row mode
    #[arg(long)]
    pub show_items: Option<usize>,
    /// Fixed display height in lines, 0 for automatic
    #[arg(long)]
    pub height: Option<u16>,
    /// Fetch timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Interval between loads in milliseconds
    #[arg(long)]
    pub refresh_ms: Option<u64>,
}

/// How log lines are timestamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTimeFormat {
    /// No timestamp.
    None,
    /// Wall clock time, UTC.
    Date,
    /// Time since start.
    #[default]
    Uptime,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Timestamp format.
    pub time: LogTimeFormat,
    /// Prefix each line with the module path.
    pub module_path: bool,
}

/// Settings specific to text feeds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Number of rows kept in row mode.
    pub show_items: usize,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self { show_items: 5 }
    }
}

/// A single feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Display name.
    pub name: String,
    /// Server base address.
    pub base_url: String,
    /// Resource path below `base_url`, or a full URL.
    pub path: String,
    /// Fixed display height in lines, 0 for automatic.
    pub height: u16,
    /// Interval between loads in milliseconds.
    pub refresh_ms: u64,
    /// Show only the latest payload in a scrolling panel.
    pub show_buttons: bool,
    /// Text feed settings.
    pub text: TextConfig,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            name: "feed".to_owned(),
            base_url: String::new(),
            path: String::new(),
            height: 0,
            refresh_ms: 1000,
            show_buttons: false,
            text: TextConfig::default(),
        }
    }
}

/// Top level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fetch timeout in milliseconds, shared by all feeds.
    pub timeout_ms: u64,
    /// Logging settings.
    pub log: LogConfig,
    /// The feed to show.
    pub feed: FeedConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            log: LogConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Config {
    /// Reads `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses TOML contents.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Loads the file named by `cli` and applies its overrides.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::load(&cli.config)?;
        config.apply(cli);
        config.validate()?;
        Ok(config)
    }

    /// Applies command line overrides.
    pub fn apply(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.feed.base_url = String::new();
            self.feed.path.clone_from(url);
        }
        if cli.panel {
            self.feed.show_buttons = true;
        }
        if let Some(show_items) = cli.show_items {
            self.feed.text.show_items = show_items;
        }
        if let Some(height) = cli.height {
            self.feed.height = height;
        }
        if let Some(timeout_ms) = cli.timeout_ms {
            self.timeout_ms = timeout_ms;
        }
        if let Some(refresh_ms) = cli.refresh_ms {
            self.feed.refresh_ms = refresh_ms;
        }
    }

    /// Checks values that would make the feed unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source().url().is_empty() {
            return Err(ConfigError::Invalid("no feed address, set feed.path or --url"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be positive"));
        }
        if self.feed.refresh_ms == 0 {
            return Err(ConfigError::Invalid("feed.refresh_ms must be positive"));
        }
        self.display().map(|_| ())
    }

    /// Display settings for the feed.
    pub fn display(&self) -> Result<DisplayConfig, ConfigError> {
        let max_visible_rows = NonZeroUsize::new(self.feed.text.show_items)
            .ok_or(ConfigError::Invalid("feed.text.show_items must be positive"))?;

        Ok(DisplayConfig {
            height: self.feed.height,
            max_visible_rows,
            show_as_scroll_panel: self.feed.show_buttons,
        })
    }

    /// Address of the feed.
    #[must_use]
    pub fn source(&self) -> FeedSource {
        FeedSource {
            name: self.feed.name.clone(),
            base_url: self.feed.base_url.clone(),
            path: self.feed.path.clone(),
        }
    }

    /// Fetch timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Interval between loads.
    #[must_use]
    pub const fn refresh(&self) -> Duration {
        Duration::from_millis(self.feed.refresh_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SAMPLE: &str = r#"
        timeout_ms = 2500

        [log]
        time = "date"

        [feed]
        name = "status"
        base_url = "http://localhost:8000"
        path = "feeds/status.txt"
        height = 50
        show_buttons = true

        [feed.text]
        show_items = 3
    "#;

    #[test]
    fn parses_full_file() {
        let config = Config::from_toml(SAMPLE).unwrap();

        assert_eq!(config.timeout(), Duration::from_millis(2500));
        assert_eq!(config.refresh(), Duration::from_millis(1000));
        assert_eq!(config.log.time, LogTimeFormat::Date);
        assert_eq!(
            config.display().unwrap(),
            DisplayConfig {
                height: 50,
                max_visible_rows: NonZeroUsize::new(3).unwrap(),
                show_as_scroll_panel: true,
            }
        );
        assert_eq!(config.source().url(), "http://localhost:8000/feeds/status.txt");
        config.validate().unwrap();
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.display().unwrap().height, 0);
        assert_eq!(config.display().unwrap().max_visible_rows.get(), 5);
    }

    #[test]
    fn zero_show_items_is_rejected() {
        let config = Config::from_toml("[feed]\npath = \"http://a/b\"\n[feed.text]\nshow_items = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_address_is_rejected() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn unknown_log_time_is_a_parse_error() {
        assert!(matches!(
            Config::from_toml("[log]\ntime = \"sometimes\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let cli = Cli::parse_from([
            "text-feed",
            "--config",
            file.path().to_str().unwrap(),
            "--url",
            "http://other/log",
            "--show-items",
            "7",
            "--timeout-ms",
            "100",
        ]);
        let config = Config::from_cli(&cli).unwrap();

        assert_eq!(config.source().url(), "http://other/log");
        assert_eq!(config.display().unwrap().max_visible_rows.get(), 7);
        assert_eq!(config.timeout(), Duration::from_millis(100));
        assert_eq!(config.feed.height, 50);
    }

    #[test]
    fn missing_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }
}
