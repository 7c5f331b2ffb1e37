use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    BadAppName { app_name: String },
    DuplicateApp { app_name: String },
    NoApp { app_name: String },
    NoOptions,
    AppDeleted { app_name: String },
    ConfigParse { path: String, message: String },
}

pub type AppResult<T> = Result<T, AppError>;

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadAppName { app_name } => {
                write!(f, "Illegal app name: '{app_name}'")
            }
            AppError::DuplicateApp { app_name } => {
                write!(
                    f,
                    "Firebase app named '{app_name}' already exists with different options or config"
                )
            }
            AppError::NoApp { app_name } => {
                write!(f, "No Firebase app '{app_name}' has been created")
            }
            AppError::NoOptions => {
                write!(f, "Firebase options are empty; provide a configuration descriptor")
            }
            AppError::AppDeleted { app_name } => {
                write!(f, "Firebase app named '{app_name}' already deleted")
            }
            AppError::ConfigParse { path, message } => {
                write!(f, "Failed to parse Firebase config '{path}': {message}")
            }
        }
    }
}

impl std::error::Error for AppError {}
