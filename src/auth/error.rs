use std::fmt;

use crate::app::AppError;

#[derive(Debug, Clone)]
pub enum AuthError {
    App(AppError),
    SignInFailed { message: String },
    NoCurrentUser,
}

pub type AuthResult<T> = Result<T, AuthError>;

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::App(err) => write!(f, "{err}"),
            AuthError::SignInFailed { message } => write!(f, "Sign-in failed: {message}"),
            AuthError::NoCurrentUser => write!(f, "No user is currently signed in"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::App(err)
    }
}
