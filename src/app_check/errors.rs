use std::fmt;

/// Error taxonomy mirrored on the attestation API's error codes. Token
/// completions carry either a token or one of these; `UnsupportedProvider`
/// and `Unknown` always come with a human-readable message and an empty
/// token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCheckError {
    UseBeforeActivation { app_name: String },
    InvalidConfiguration { message: String },
    UnsupportedProvider { message: String },
    Unknown { message: String },
    TokenUnavailable,
    Internal(String),
}

pub type AppCheckResult<T> = Result<T, AppCheckError>;

impl fmt::Display for AppCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppCheckError::UseBeforeActivation { app_name } => {
                write!(
                    f,
                    "App Check used before activation for Firebase app '{app_name}'"
                )
            }
            AppCheckError::InvalidConfiguration { message } => {
                write!(f, "Invalid App Check configuration: {message}")
            }
            AppCheckError::UnsupportedProvider { message } => {
                write!(f, "Unsupported App Check provider: {message}")
            }
            AppCheckError::Unknown { message } => {
                write!(f, "App Check attestation failed: {message}")
            }
            AppCheckError::TokenUnavailable => {
                write!(f, "No App Check token has been fetched yet")
            }
            AppCheckError::Internal(message) => {
                write!(f, "Internal App Check error: {message}")
            }
        }
    }
}

impl std::error::Error for AppCheckError {}
