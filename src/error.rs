use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Bad connector configuration. The message is shown to the end user as is.
    #[error("{0}")]
    Validation(String),

    #[error("Graph API error: {0}")]
    Graph(String),

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("CSV output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConnectorError>;

const GENERIC_USER_TEXT: &str =
    "An error occurred while fetching data. Try again later or report the problem if it persists.";

/// Error surfaced to the person using the reporting host.
///
/// `text` is meant for the end user, `debug_text` for whoever debugs the
/// connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserError {
    pub text: String,
    pub debug_text: Option<String>,
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.debug_text {
            Some(debug) => write!(f, "{} ({})", self.text, debug),
            None => f.write_str(&self.text),
        }
    }
}

impl std::error::Error for UserError {}

impl From<ConnectorError> for UserError {
    fn from(err: ConnectorError) -> Self {
        match err {
            ConnectorError::Validation(text) => UserError {
                debug_text: Some(format!("Invalid connector configuration: {text}")),
                text,
            },
            other => UserError {
                text: GENERIC_USER_TEXT.to_string(),
                debug_text: Some(format!("Error fetching data from the API: {other}")),
            },
        }
    }
}
