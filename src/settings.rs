//! Environment-driven settings.

use crate::error::{AdGeniusError, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the data directory.
pub const DATA_DIR_ENV: &str = "ADGENIUS_DATA_DIR";

/// Overrides the Veo poll interval, in seconds.
pub const POLL_INTERVAL_ENV: &str = "ADGENIUS_POLL_INTERVAL_SECS";

/// Application directory name under the platform data dir.
const APP_DIR: &str = "adgenius";

/// Runtime settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key, if one is configured.
    pub api_key: Option<String>,
    /// Holds the history file and the `videos/` directory.
    pub data_dir: PathBuf,
    /// Delay between Veo status checks.
    pub poll_interval: Duration,
}

impl Settings {
    /// Reads settings from the environment.
    pub fn from_env() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };

        let poll_interval = match std::env::var(POLL_INTERVAL_ENV) {
            Ok(raw) => parse_poll_interval(&raw)?,
            Err(_) => crate::video::DEFAULT_POLL_INTERVAL,
        };

        Ok(Self {
            api_key: crate::google::resolve_api_key(None),
            data_dir,
            poll_interval,
        })
    }

    /// Directory generated videos are written to.
    pub fn video_dir(&self) -> PathBuf {
        self.data_dir.join("videos")
    }
}

/// Platform data directory for the app.
pub fn default_data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .map(|p| p.join(APP_DIR))
        .ok_or_else(|| {
            AdGeniusError::InvalidRequest(format!(
                "could not find a data directory; set {DATA_DIR_ENV}"
            ))
        })
}

fn parse_poll_interval(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(AdGeniusError::InvalidRequest(format!(
            "{POLL_INTERVAL_ENV} must be a positive number of seconds, got {raw:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poll_interval() {
        assert_eq!(parse_poll_interval("8").unwrap(), Duration::from_secs(8));
        assert_eq!(parse_poll_interval(" 3 ").unwrap(), Duration::from_secs(3));
        assert!(parse_poll_interval("0").is_err());
        assert!(parse_poll_interval("fast").is_err());
    }

    #[test]
    fn test_video_dir_is_under_data_dir() {
        let settings = Settings {
            api_key: None,
            data_dir: PathBuf::from("/tmp/adgenius"),
            poll_interval: Duration::from_secs(8),
        };
        assert_eq!(settings.video_dir(), PathBuf::from("/tmp/adgenius/videos"));
    }
}
