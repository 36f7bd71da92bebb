use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the importer
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("{} not found.", .0.display())]
    #[diagnostic(code(birthday_importer::file_not_found))]
    FileNotFound(PathBuf),

    #[error("Missing column \"{column}\". Found: {found:?}")]
    #[diagnostic(
        code(birthday_importer::schema),
        help("Check the column names in the config against the header row of the roster file")
    )]
    Schema { column: String, found: Vec<String> },

    #[error("Invalid birthday \"{value}\" for {name}: expected format {format} ({reason})")]
    #[diagnostic(code(birthday_importer::date_parse))]
    DateParse {
        name: String,
        value: String,
        format: String,
        reason: String,
    },

    #[error("{} not found. Ask the calendar owner to generate it.", .0.display())]
    #[diagnostic(
        code(birthday_importer::missing_client_secret),
        help(
            "Download the OAuth client secret of a desktop application \
             from the Google Cloud console"
        )
    )]
    MissingClientSecret(PathBuf),

    #[error("Target calendar \"{0}\" not found. Check the name exactly.")]
    #[diagnostic(code(birthday_importer::calendar_not_found))]
    CalendarNotFound(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(birthday_importer::google_calendar))]
    GoogleCalendar(String),

    #[error("Authorization error: {0}")]
    #[diagnostic(code(birthday_importer::authorization))]
    Authorization(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(birthday_importer::config))]
    Config(String),

    #[error("CSV error: {0}")]
    #[diagnostic(code(birthday_importer::csv))]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    #[diagnostic(code(birthday_importer::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(birthday_importer::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(birthday_importer::other))]
    Other(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type ImportResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create authorization errors
pub fn authorization_error(message: &str) -> Error {
    Error::Authorization(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
