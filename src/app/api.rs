use std::collections::HashMap;
use std::sync::{LazyLock, Mutex};

use crate::app::errors::{AppError, AppResult};
use crate::app::types::{FirebaseApp, FirebaseAppConfig, FirebaseAppSettings, FirebaseOptions};

pub const DEFAULT_ENTRY_NAME: &str = "[DEFAULT]";

static APPS: LazyLock<Mutex<HashMap<String, FirebaseApp>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn normalize_name(settings: &FirebaseAppSettings) -> AppResult<String> {
    let name = settings
        .name
        .clone()
        .unwrap_or_else(|| DEFAULT_ENTRY_NAME.to_string());
    if name.trim().is_empty() {
        return Err(AppError::BadAppName { app_name: name });
    }
    Ok(name)
}

/// Create (or fetch, when options match) the named application context.
pub fn initialize_app(
    options: FirebaseOptions,
    settings: Option<FirebaseAppSettings>,
) -> AppResult<FirebaseApp> {
    let settings = settings.unwrap_or_default();
    let name = normalize_name(&settings)?;

    if !options.is_defined() {
        return Err(AppError::NoOptions);
    }

    let config = FirebaseAppConfig::new(name.clone());

    let mut apps = APPS.lock().unwrap();
    if let Some(existing) = apps.get(&name) {
        if existing.options() == options && existing.config() == config {
            return Ok(existing.clone());
        }
        return Err(AppError::DuplicateApp { app_name: name });
    }

    let app = FirebaseApp::new(options, config);
    apps.insert(name, app.clone());
    Ok(app)
}

pub fn get_app(name: Option<&str>) -> AppResult<FirebaseApp> {
    let lookup = name.unwrap_or(DEFAULT_ENTRY_NAME);
    if let Some(app) = APPS.lock().unwrap().get(lookup) {
        return Ok(app.clone());
    }
    Err(AppError::NoApp {
        app_name: lookup.to_string(),
    })
}

pub fn get_apps() -> Vec<FirebaseApp> {
    APPS.lock().unwrap().values().cloned().collect()
}

/// Remove the app from the registry and mark the handle deleted. Dependent
/// sessions must be released before the context.
pub fn delete_app(app: &FirebaseApp) -> AppResult<()> {
    let removed = APPS.lock().unwrap().remove(app.name());
    if removed.is_some() {
        app.set_is_deleted(true);
    }
    Ok(())
}
