use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad kind of failure reported to the user by a command.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The home directory or `config.json` is missing or invalid.
    Config,
    /// Reading or writing month files or backups failed.
    Storage,
    /// A pasted sync block could not be used.
    Sync,
    /// The user supplied something unusable.
    Input,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// An error that has been classified for display. The message carries the whole context chain of
/// the underlying error.
#[derive(Debug, thiserror::Error)]
#[error("{error_type} error: {message}")]
pub struct PublicError {
    error_type: ErrorType,
    message: String,
}

impl PublicError {
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Classifies the error of a `Result` for display.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            let e: Error = e.into();
            if e.is::<PublicError>() {
                return e;
            }
            PublicError {
                error_type,
                message: format!("{e:#}"),
            }
            .into()
        })
    }
}

/// Returns a classified error carrying `message`.
pub fn public_error<T>(error_type: ErrorType, message: impl Display) -> Result<T> {
    Err(PublicError {
        error_type,
        message: message.to_string(),
    }
    .into())
}
