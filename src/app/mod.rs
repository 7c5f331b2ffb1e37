//! Application context: options, named registry, and the connection
//! descriptor loader. An app handle is the root every dependent session
//! (auth, database, App Check) hangs off; it is created first and released
//! last.

mod api;
mod config;
mod errors;
mod types;

pub use api::{delete_app, get_app, get_apps, initialize_app, DEFAULT_ENTRY_NAME};
pub use config::{find_firebase_config, load_firebase_config, FIREBASE_CONFIG_ENV};
pub use errors::{AppError, AppResult};
pub use types::{FirebaseApp, FirebaseAppConfig, FirebaseAppSettings, FirebaseOptions};
