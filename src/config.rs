use crate::error::{config_error, ImportResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default calendar the roster is imported into
pub const DEFAULT_CALENDAR_NAME: &str = "Cornell Assistive Technologies Subteam Calendar";
/// Default location of the config file
pub const DEFAULT_CONFIG_FILE: &str = "config/importer.toml";
/// OAuth scope needed to read calendars and insert events
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";
/// Google Calendar v3 REST endpoint
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Main configuration structure for the importer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Display name of the calendar to import into
    pub target_calendar_name: String,
    /// Roster CSV file
    pub input_path: PathBuf,
    /// Header of the name column
    pub name_column: String,
    /// Header of the birthday column
    pub date_column: String,
    /// chrono format of the birthday column
    pub date_format: String,
    /// OAuth client secret downloaded from the Google Cloud console
    pub client_secret_path: PathBuf,
    /// Cached authorized-user token
    pub token_path: PathBuf,
    /// OAuth scopes requested during interactive authorization
    pub scopes: Vec<String>,
    /// Base URL of the Calendar API
    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
            input_path: PathBuf::from("birthdays.csv"),
            name_column: "First and Last Name".to_string(),
            date_column: "Birthday!! YAY".to_string(),
            date_format: "%m/%d/%Y".to_string(),
            client_secret_path: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            scopes: vec![CALENDAR_SCOPE.to_string()],
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

/// Subset of the config that may be set in the TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    target_calendar_name: Option<String>,
    input_path: Option<PathBuf>,
    name_column: Option<String>,
    date_column: Option<String>,
    date_format: Option<String>,
    client_secret_path: Option<PathBuf>,
    token_path: Option<PathBuf>,
    scopes: Option<Vec<String>>,
    api_base_url: Option<String>,
}

impl Config {
    /// Load configuration from defaults, the config file and the environment
    pub fn load() -> ImportResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let config_path = env::var("BIRTHDAY_IMPORTER_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = Self::default();
        if config_path.exists() {
            config.merge_file(&config_path)?;
        }
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Merge values from a TOML file over the current ones
    pub fn merge_file(&mut self, path: &Path) -> ImportResult<()> {
        let content = fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&content)?;

        if let Some(v) = file.target_calendar_name {
            self.target_calendar_name = v;
        }
        if let Some(v) = file.input_path {
            self.input_path = v;
        }
        if let Some(v) = file.name_column {
            self.name_column = v;
        }
        if let Some(v) = file.date_column {
            self.date_column = v;
        }
        if let Some(v) = file.date_format {
            self.date_format = v;
        }
        if let Some(v) = file.client_secret_path {
            self.client_secret_path = v;
        }
        if let Some(v) = file.token_path {
            self.token_path = v;
        }
        if let Some(v) = file.scopes {
            self.scopes = v;
        }
        if let Some(v) = file.api_base_url {
            self.api_base_url = v;
        }

        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("BIRTHDAY_CALENDAR_NAME") {
            self.target_calendar_name = v;
        }
        if let Some(v) = lookup("BIRTHDAY_CSV_FILE") {
            self.input_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("BIRTHDAY_NAME_COLUMN") {
            self.name_column = v;
        }
        if let Some(v) = lookup("BIRTHDAY_DATE_COLUMN") {
            self.date_column = v;
        }
        if let Some(v) = lookup("BIRTHDAY_DATE_FORMAT") {
            self.date_format = v;
        }
        if let Some(v) = lookup("GOOGLE_CLIENT_SECRET_FILE") {
            self.client_secret_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("GOOGLE_TOKEN_FILE") {
            self.token_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("GOOGLE_CALENDAR_API_URL") {
            self.api_base_url = v;
        }
    }

    /// Reject configurations the importer cannot run with
    pub fn validate(&self) -> ImportResult<()> {
        if self.target_calendar_name.is_empty() {
            return Err(config_error("target_calendar_name must not be empty"));
        }
        if self.name_column.is_empty() || self.date_column.is_empty() {
            return Err(config_error("column names must not be empty"));
        }
        if self.date_format.is_empty() {
            return Err(config_error("date_format must not be empty"));
        }
        if self.scopes.is_empty() {
            return Err(config_error("at least one OAuth scope is required"));
        }
        Ok(())
    }
}
