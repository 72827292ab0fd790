use serde_json::Value;
use thiserror::Error;

pub type OpenViduResult<T> = Result<T, OpenViduError>;

#[derive(Debug, Error)]
pub enum OpenViduError {
    /// The server answered with a status the operation does not expect
    #[error("{status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a usable response
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    #[error("Invalid server url: {0}")]
    Url(#[from] url::ParseError),
}

impl OpenViduError {
    pub const UNKNOWN_ERROR: &'static str = "Unknown error";

    /// Translates a status code and an optional response body into an error.
    ///
    /// The message is taken from the `message` field when the body is JSON,
    /// otherwise the body itself is used.
    pub fn from_response(status: u16, body: Option<&str>) -> Self {
        let message = match body.filter(|b| !b.is_empty()) {
            Some(body) => extract_message(body).unwrap_or_else(|| body.to_string()),
            None => Self::UNKNOWN_ERROR.to_string(),
        };

        Self::Api { status, message }
    }

    /// Returns the status code, if the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Url(_) => None,
        }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    match value.get("message")? {
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
