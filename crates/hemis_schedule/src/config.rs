/// Configuration for the schedule sync service
use crate::error::ScheduleError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Schedule endpoint of the JBNUU HEMIS instance.
pub const DEFAULT_BASE_URL: &str = "https://student.jbnuu.uz/rest/v1/education/schedule";

/// How the sync pipeline treats an entry that cannot be mapped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Stop at the first malformed entry and surface the error
    #[default]
    Abort,
    /// Log the entry, skip it and keep going
    Skip,
}

/// Connection settings for the remote HEMIS API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HemisConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Static bearer token
    #[serde(default)]
    pub token: String,
    /// Treat any non-200 response as an empty schedule instead of an error
    #[serde(default)]
    pub legacy_empty_on_error: bool,
}

impl HemisConfig {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            legacy_empty_on_error: false,
        }
    }
}

impl Default for HemisConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, "")
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub hemis: HemisConfig,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_week")]
    pub default_week: i64,
    #[serde(default = "default_semester")]
    pub default_semester: i64,
    #[serde(default)]
    pub malformed_policy: MalformedPolicy,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("schedule.db")
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_week() -> i64 {
    2937
}

fn default_semester() -> i64 {
    15
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hemis: HemisConfig::default(),
            db_path: default_db_path(),
            listen_addr: default_listen_addr(),
            default_week: default_week(),
            default_semester: default_semester(),
            malformed_policy: MalformedPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration for the service.
    ///
    /// Reads the optional JSON file first, then the `.env` file (if any) and finally the process
    /// environment, with later sources taking precedence.
    ///
    /// # Arguments
    /// * `config_file` - Optional path to a JSON config file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Validated configuration with a non-empty token
    /// * `Err` - If the file can't be parsed, the token is missing or the base URL is invalid
    pub fn load(config_file: Option<&Path>) -> Result<Self, ScheduleError> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        dotenvy::dotenv().ok();
        config.apply_env(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parses a JSON config file
    pub fn from_file(path: &Path) -> Result<Self, ScheduleError> {
        let content = fs::read_to_string(path).map_err(|e| ScheduleError::Config {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| ScheduleError::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
        })
    }

    /// Overrides fields from environment variables, looked up through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("HEMIS_TOKEN") {
            self.hemis.token = token;
        }
        if let Some(base_url) = lookup("HEMIS_BASE_URL") {
            self.hemis.base_url = base_url;
        }
        if let Some(flag) = lookup("HEMIS_LEGACY_EMPTY_ON_ERROR") {
            self.hemis.legacy_empty_on_error = matches!(flag.as_str(), "1" | "true" | "yes");
        }
        if let Some(db_path) = lookup("SCHEDULE_DB") {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(addr) = lookup("SCHEDULE_LISTEN_ADDR") {
            self.listen_addr = addr;
        }
    }

    /// Checks that the token is present and the base URL parses
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.hemis.token.trim().is_empty() {
            return Err(ScheduleError::Config {
                message: "HEMIS_TOKEN is not set".to_string(),
            });
        }
        Url::parse(&self.hemis.base_url)?;
        Ok(())
    }
}
