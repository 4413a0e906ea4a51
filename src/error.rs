//! Error types for the config pipeline
//!
//! Centralized error handling using snafu for ergonomic error definitions.
//! Every stage of a submission (parse, validate, persist) reports through
//! this one enum so the controller can turn any failure into a single
//! user-visible message.

use snafu::Snafu;

/// Main error type for the crate
#[derive(Debug, Snafu)]
pub enum Error {
    /// Invalid local state or settings
    #[snafu(display("Invalid: {message}"))]
    Invalid { message: String },

    /// The editor text is not a well-formed object literal
    #[snafu(display("{message} at line {line}, column {column}"))]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// The parsed object lacks required fields
    ///
    /// `fields` names every offending key, the message stays one sentence.
    #[snafu(display("{message}"))]
    Validation {
        message: String,
        fields: Vec<&'static str>,
    },

    /// Token fetch or persist call failed
    #[snafu(display("{message}"))]
    Network { message: String },

    /// No user is signed in
    #[snafu(display("You must be signed in to update the config."))]
    SignedOut,

    /// A submission is already running
    #[snafu(display("A submission is already in progress."))]
    Busy,

    /// IO error (settings file operations)
    #[snafu(display("IO error: {source}"))]
    Io { source: std::io::Error },

    /// JSON serialization/deserialization error
    #[snafu(display("JSON error: {source}"))]
    Json { source: serde_json::Error },

    /// TOML deserialization error
    #[snafu(display("TOML parse error: {source}"))]
    TomlDe { source: toml::de::Error },

    /// TOML serialization error
    #[snafu(display("TOML serialize error: {source}"))]
    TomlSe { source: toml::ser::Error },
}

impl Error {
    /// Message shown to the user, with the backend's diagnostic prefix removed
    ///
    /// Only the first occurrence of `backend_prefix` is dropped; an empty
    /// prefix leaves the message untouched.
    pub fn user_message(&self, backend_prefix: &str) -> String {
        let message = self.to_string();
        if backend_prefix.is_empty() {
            message
        } else {
            message.replacen(backend_prefix, "", 1)
        }
    }

    /// Whether the failure happened before any network call was attempted
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. } | Error::Validation { .. } | Error::SignedOut | Error::Busy
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io { source }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Error::Json { source }
    }
}

impl From<toml::de::Error> for Error {
    fn from(source: toml::de::Error) -> Self {
        Error::TomlDe { source }
    }
}

impl From<toml::ser::Error> for Error {
    fn from(source: toml::ser::Error) -> Self {
        Error::TomlSe { source }
    }
}

/// Result type alias for convenience
pub type Result<T, E = Error> = std::result::Result<T, E>;
