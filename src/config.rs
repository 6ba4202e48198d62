use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::scheduler::DEFAULT_POLL_INTERVAL;
use crate::theme::ThemeConfig;

pub const APP_DIR: &str = "remindme";

/// Settings read from `<config_dir>/remindme/config.toml`. Every key is
/// optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub poll_interval_secs: u64,
    pub data_file: Option<PathBuf>,
    pub minimize_to_tray: bool,
    pub notification_timeout_secs: u32,
    pub log_level: String,
    pub theme: ThemeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            data_file: None,
            minimize_to_tray: true,
            notification_timeout_secs: 10,
            log_level: "info".to_string(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Config {
    /// Missing file gives defaults; a broken one gives defaults plus a
    /// description of the problem, to be logged once logging is up.
    pub fn load() -> (Self, Option<String>) {
        let Some(path) = config_path() else {
            return (Self::default(), None);
        };
        let Ok(content) = std::fs::read_to_string(&path) else {
            return (Self::default(), None);
        };
        match Self::parse(&content) {
            Ok(config) => (config, None),
            Err(err) => (
                Self::default(),
                Some(format!("ignoring unreadable config {}: {err}", path.display())),
            ),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn data_path(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join(APP_DIR))
                .unwrap_or_default()
                .join("reminders.json")
        })
    }

    pub fn log_dir(&self) -> Option<PathBuf> {
        dirs::data_local_dir().map(|d| d.join(APP_DIR).join("logs"))
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert!(config.minimize_to_tray);
        assert_eq!(config.notification_timeout_secs, 10);
        assert_eq!(config.log_level, "info");
        assert!(config.data_path().ends_with("reminders.json"));
    }

    #[test]
    fn reads_overrides_and_theme_table() {
        let config = Config::parse(
            r##"
            poll_interval_secs = 0
            data_file = "/tmp/r.json"
            minimize_to_tray = false
            log_level = "debug"

            [theme]
            preset = "nord"
            due_fg = "#ff0000"
            "##,
        )
        .unwrap();

        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.data_path(), PathBuf::from("/tmp/r.json"));
        assert!(!config.minimize_to_tray);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.theme.preset.as_deref(), Some("nord"));
    }

    #[test]
    fn rejects_wrong_types() {
        assert!(Config::parse("poll_interval_secs = \"soon\"").is_err());
    }
}
