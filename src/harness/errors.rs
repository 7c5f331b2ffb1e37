use std::fmt;

use crate::app::AppError;
use crate::app_check::AppCheckError;
use crate::auth::AuthError;
use crate::database::DatabaseError;

#[derive(Debug, Clone)]
pub enum HarnessError {
    App(AppError),
    AppCheck(AppCheckError),
    Auth(AuthError),
    Database(DatabaseError),
    /// A lifecycle step was invoked before the step it depends on.
    OutOfOrder {
        operation: &'static str,
        requires: &'static str,
    },
}

pub type HarnessResult<T> = Result<T, HarnessError>;

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HarnessError::App(err) => write!(f, "{err}"),
            HarnessError::AppCheck(err) => write!(f, "{err}"),
            HarnessError::Auth(err) => write!(f, "{err}"),
            HarnessError::Database(err) => write!(f, "{err}"),
            HarnessError::OutOfOrder {
                operation,
                requires,
            } => {
                write!(f, "{operation} requires {requires} to have completed first")
            }
        }
    }
}

impl std::error::Error for HarnessError {}

impl From<AppError> for HarnessError {
    fn from(err: AppError) -> Self {
        HarnessError::App(err)
    }
}

impl From<AppCheckError> for HarnessError {
    fn from(err: AppCheckError) -> Self {
        HarnessError::AppCheck(err)
    }
}

impl From<AuthError> for HarnessError {
    fn from(err: AuthError) -> Self {
        HarnessError::Auth(err)
    }
}

impl From<DatabaseError> for HarnessError {
    fn from(err: DatabaseError) -> Self {
        HarnessError::Database(err)
    }
}
