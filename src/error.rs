//! Structured error types for report rendering and delivery.
//!
//! Missing form fields are never errors. What is left is bad input (record
//! JSON, config TOML), image trouble, I/O, and the relay saying no.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type returned by the public API.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Record JSON failed to parse.
    #[error("Failed to parse report record: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// Config TOML failed to parse.
    #[error("Config error: {0}")]
    Config(String),

    /// An image could not be decoded or embedded.
    #[error("Image error: {0}")]
    Image(String),

    /// A photo decode did not finish within the configured limit.
    #[error("Photo '{name}' did not decode within {millis} ms")]
    PhotoTimeout { name: String, millis: u64 },

    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error on {}: {source}", display_path(.path))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The email relay rejected the upload or could not be reached.
    #[error("Email relay failed{}: {message}", status_suffix(.status))]
    Relay {
        status: Option<u16>,
        message: String,
    },
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

fn display_path(path: &std::path::Path) -> String {
    path.display().to_string()
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl From<serde_json::Error> for ReportError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "A report record is a flat JSON object of strings, numbers, string lists and a `photos` array.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        ReportError::Parse { source: e, hint }
    }
}

impl From<toml::de::Error> for ReportError {
    fn from(e: toml::de::Error) -> Self {
        ReportError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        ReportError::Relay {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl ReportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
