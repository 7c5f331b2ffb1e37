use std::sync::atomic::{AtomicUsize, Ordering};

use crate::app::{initialize_app, FirebaseApp, FirebaseAppSettings, FirebaseOptions};

static APP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Build a registered Firebase app with a unique name for use in tests.
///
/// Going through `initialize_app` keeps the app in the registry, so tests
/// exercising deletion behave the same way production callers do.
pub fn test_firebase_app(prefix: &str) -> FirebaseApp {
    let id = APP_COUNTER.fetch_add(1, Ordering::SeqCst);
    let options = FirebaseOptions {
        api_key: Some("test-key".into()),
        project_id: Some("test-project".into()),
        app_id: Some("1:0:test:app".into()),
        ..Default::default()
    };
    let settings = FirebaseAppSettings {
        name: Some(format!("{prefix}-{id}")),
    };
    initialize_app(options, Some(settings)).expect("initialize test app")
}
