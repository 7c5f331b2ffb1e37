use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app::errors::{AppError, AppResult};
use crate::app::types::FirebaseOptions;

/// Environment variable that may point at the connection descriptor, taking
/// the place of the build-time `FIREBASE_CONFIG` string constant.
pub const FIREBASE_CONFIG_ENV: &str = "FIREBASE_CONFIG";

const CONFIG_CANDIDATES: &[&str] = &[
    "firebase-config.json",
    "google-services-desktop.json",
    "google-services.json",
];

/// Locate the backend-connection descriptor.
///
/// The explicitly configured path wins, then the `FIREBASE_CONFIG`
/// environment variable, then the well-known file names in the current
/// directory and its ancestors. Returns `None` when nothing is found, which
/// callers treat as "run against built-in test options".
pub fn find_firebase_config(configured: &str) -> Option<PathBuf> {
    if !configured.is_empty() {
        let path = PathBuf::from(configured);
        if path.is_file() {
            return Some(path);
        }
    }

    if let Ok(from_env) = env::var(FIREBASE_CONFIG_ENV) {
        if !from_env.is_empty() {
            let path = PathBuf::from(from_env);
            if path.is_file() {
                return Some(path);
            }
        }
    }

    let mut dir = env::current_dir().ok()?;
    loop {
        for candidate in CONFIG_CANDIDATES {
            let path = dir.join(candidate);
            if path.is_file() {
                return Some(path);
            }
        }
        if !dir.pop() {
            return None;
        }
    }
}

/// Parse a located descriptor into Firebase options.
pub fn load_firebase_config(path: &Path) -> AppResult<FirebaseOptions> {
    let raw = fs::read_to_string(path).map_err(|err| AppError::ConfigParse {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;
    let options: FirebaseOptions =
        serde_json::from_str(&raw).map_err(|err| AppError::ConfigParse {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
    if !options.is_defined() {
        return Err(AppError::ConfigParse {
            path: path.display().to_string(),
            message: "descriptor contains no recognized fields".to_string(),
        });
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

    fn write_temp_config(contents: &str) -> PathBuf {
        let id = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = env::temp_dir().join(format!(
            "app-check-harness-config-{}-{id}.json",
            std::process::id()
        ));
        fs::write(&path, contents).expect("write temp config");
        path
    }

    #[test]
    fn loads_camel_case_descriptor() {
        let path = write_temp_config(
            r#"{
                "apiKey": "key-123",
                "projectId": "demo-project",
                "databaseURL": null,
                "appId": "1:1:web:abc"
            }"#,
        );
        let options = load_firebase_config(&path).expect("parse descriptor");
        assert_eq!(options.api_key.as_deref(), Some("key-123"));
        assert_eq!(options.project_id.as_deref(), Some("demo-project"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_empty_descriptor() {
        let path = write_temp_config("{}");
        let result = load_firebase_config(&path);
        assert!(matches!(result, Err(AppError::ConfigParse { .. })));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn explicit_path_is_preferred() {
        let path = write_temp_config(r#"{"projectId": "explicit"}"#);
        let found = find_firebase_config(path.to_str().unwrap()).expect("find config");
        assert_eq!(found, path);
        let _ = fs::remove_file(path);
    }
}
