use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use crate::app::FirebaseApp;

use super::errors::{AppCheckError, AppCheckResult};
use super::logger::LOGGER;
use super::providers::AppCheckProvider;
use super::types::{
    AppCheckListener, AppCheckOptions, AppCheckToken, ListenerEntry, ListenerHandle,
};

/// App Check façade for one application context.
///
/// All state (cached token, listener registry) is per-instance; the provider
/// is fixed at construction from the options object, so there is no
/// configuration ordering hazard between provider selection and context
/// creation.
#[derive(Clone)]
pub struct AppCheck {
    inner: Arc<AppCheckInner>,
}

struct AppCheckInner {
    app: FirebaseApp,
    provider: Arc<dyn AppCheckProvider>,
    state: Mutex<FacadeState>,
}

#[derive(Default)]
struct FacadeState {
    token: Option<AppCheckToken>,
    observers: Vec<ListenerEntry>,
}

impl AppCheck {
    /// Bind an App Check instance to the app using the given options. Fails
    /// with `UnsupportedProvider` when the selected factory reports the
    /// capability absent on this platform.
    pub fn new(app: &FirebaseApp, options: AppCheckOptions) -> AppCheckResult<Self> {
        app.check_destroyed()
            .map_err(|_| AppCheckError::UseBeforeActivation {
                app_name: app.name().to_owned(),
            })?;

        let provider = options.provider.create(app).ok_or_else(|| {
            AppCheckError::UnsupportedProvider {
                message: format!(
                    "provider '{}' is not available on this platform",
                    options.provider.as_str()
                ),
            }
        })?;

        LOGGER.debug(format!(
            "App Check activated for app '{}' with provider '{}'",
            app.name(),
            options.provider.as_str()
        ));

        Ok(Self {
            inner: Arc::new(AppCheckInner {
                app: app.clone(),
                provider,
                state: Mutex::new(FacadeState::default()),
            }),
        })
    }

    pub fn app(&self) -> &FirebaseApp {
        &self.inner.app
    }

    /// Fetch an attestation token.
    ///
    /// With `force_refresh` unset and a valid cached token the cached token
    /// is returned as-is, identical expiry included, without contacting the
    /// provider. A forced refresh always goes to the provider and yields a
    /// token with a new expiry. Registered listeners are notified about the
    /// change before the returned future resolves.
    pub async fn get_token(&self, force_refresh: bool) -> AppCheckResult<AppCheckToken> {
        if !force_refresh {
            let cached = self.inner.state.lock().unwrap().token.clone();
            if let Some(token) = cached {
                if !token.is_expired() {
                    return Ok(token);
                }
            }
        }

        let token = self.inner.provider.get_token().await?;
        self.store_token(token.clone());
        Ok(token)
    }

    /// The most recently resolved token, without issuing a new request.
    /// Resolves immediately.
    pub async fn get_token_last_result(&self) -> AppCheckResult<AppCheckToken> {
        self.inner
            .state
            .lock()
            .unwrap()
            .token
            .clone()
            .ok_or(AppCheckError::TokenUnavailable)
    }

    /// Register a token-changed listener. The listener observes every
    /// successful token change from the next request onwards; it is never
    /// replayed the current token.
    pub fn add_token_listener(&self, listener: AppCheckListener) -> ListenerHandle {
        let entry = ListenerEntry::new(listener);
        let id = entry.id;
        self.inner.state.lock().unwrap().observers.push(entry);

        let inner = Arc::downgrade(&self.inner);
        let remover = Arc::new(move |listener_id: u64| {
            if let Some(inner) = inner.upgrade() {
                inner
                    .state
                    .lock()
                    .unwrap()
                    .observers
                    .retain(|entry| entry.id != listener_id);
            }
        });

        ListenerHandle {
            id,
            remover,
            unsubscribed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn remove_token_listener(&self, handle: &ListenerHandle) {
        handle.unsubscribe();
    }

    fn store_token(&self, token: AppCheckToken) {
        let listeners: Vec<AppCheckListener> = {
            let mut state = self.inner.state.lock().unwrap();
            state.token = Some(token.clone());
            state
                .observers
                .iter()
                .map(|entry| entry.listener.clone())
                .collect()
        };

        LOGGER.debug(format!(
            "Stored App Check token for app '{}' (expires {} ms)",
            self.inner.app.name(),
            token.expire_time_millis()
        ));

        for listener in listeners {
            listener(&token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_check::providers::ProviderKind;
    use crate::test_support::test_firebase_app;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn debug_app_check(name: &str) -> AppCheck {
        let app = test_firebase_app(name);
        AppCheck::new(&app, AppCheckOptions::new(ProviderKind::Debug)).expect("activate")
    }

    #[tokio::test(flavor = "current_thread")]
    async fn non_forced_request_is_idempotent() {
        let app_check = debug_app_check("idempotent");

        let first = app_check.get_token(true).await.expect("first token");
        let second = app_check.get_token(false).await.expect("cached token");
        assert_eq!(first.expire_time_millis(), second.expire_time_millis());
        assert_eq!(first.token, second.token);

        let third = app_check.get_token(true).await.expect("refreshed token");
        assert_ne!(first.expire_time_millis(), third.expire_time_millis());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn last_result_matches_previous_request() {
        let app_check = debug_app_check("last-result");
        assert!(matches!(
            app_check.get_token_last_result().await,
            Err(AppCheckError::TokenUnavailable)
        ));

        let fetched = app_check.get_token(true).await.expect("token");
        let last = app_check.get_token_last_result().await.expect("last result");
        assert_eq!(fetched.expire_time_millis(), last.expire_time_millis());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn listener_fires_before_request_resolves() {
        let app_check = debug_app_check("listener-order");
        let changes = Arc::new(AtomicUsize::new(0));
        let counted = changes.clone();
        let _handle = app_check.add_token_listener(Arc::new(move |_token| {
            counted.fetch_add(1, Ordering::SeqCst);
        }));

        let _token = app_check.get_token(true).await.expect("token");
        assert_eq!(changes.load(Ordering::SeqCst), 1);

        // Cache hit: no change, no notification.
        let _token = app_check.get_token(false).await.expect("cached");
        assert_eq!(changes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn removed_listener_observes_nothing() {
        let app_check = debug_app_check("listener-removed");
        let changes = Arc::new(AtomicUsize::new(0));
        let counted = changes.clone();
        let handle = app_check.add_token_listener(Arc::new(move |_token| {
            counted.fetch_add(1, Ordering::SeqCst);
        }));
        app_check.remove_token_listener(&handle);

        let _token = app_check.get_token(true).await.expect("token");
        assert_eq!(changes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn deleted_app_cannot_activate() {
        let app = test_firebase_app("deleted-app");
        crate::app::delete_app(&app).unwrap();
        let result = AppCheck::new(&app, AppCheckOptions::new(ProviderKind::Debug));
        assert!(matches!(
            result,
            Err(AppCheckError::UseBeforeActivation { .. })
        ));
    }
}
