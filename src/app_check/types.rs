use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::errors::{AppCheckError, AppCheckResult};
use super::providers::ProviderKind;

/// Short-lived attestation credential. Immutable once returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppCheckToken {
    pub token: String,
    pub expire_time: SystemTime,
}

impl AppCheckToken {
    pub fn with_ttl(token: impl Into<String>, ttl: Duration) -> AppCheckResult<Self> {
        let expire_time = SystemTime::now().checked_add(ttl).ok_or_else(|| {
            AppCheckError::Internal("failed to compute token expiration".to_string())
        })?;
        Ok(Self {
            token: token.into(),
            expire_time,
        })
    }

    pub fn is_expired(&self) -> bool {
        SystemTime::now() >= self.expire_time
    }

    /// Expiry as milliseconds since the Unix epoch; zero only for a token
    /// that was never issued.
    pub fn expire_time_millis(&self) -> u64 {
        self.expire_time
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Callback fired once per successful token change.
pub type AppCheckListener = Arc<dyn Fn(&AppCheckToken) + Send + Sync + 'static>;

static LISTENER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone)]
pub(crate) struct ListenerEntry {
    pub id: u64,
    pub listener: AppCheckListener,
}

impl ListenerEntry {
    pub fn new(listener: AppCheckListener) -> Self {
        Self {
            id: LISTENER_ID.fetch_add(1, Ordering::SeqCst),
            listener,
        }
    }
}

/// Registration handle. Unsubscribing (explicitly or on drop) guarantees the
/// listener observes no further token changes.
#[derive(Clone)]
pub struct ListenerHandle {
    pub(crate) id: u64,
    pub(crate) remover: Arc<dyn Fn(u64) + Send + Sync + 'static>,
    pub(crate) unsubscribed: Arc<AtomicBool>,
}

impl ListenerHandle {
    pub fn unsubscribe(&self) {
        if self
            .unsubscribed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            (self.remover)(self.id);
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

/// Explicit configuration object handed to `AppCheck::new` at context
/// creation time; there is no process-wide provider factory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppCheckOptions {
    pub provider: ProviderKind,
}

impl AppCheckOptions {
    pub fn new(provider: ProviderKind) -> Self {
        Self { provider }
    }
}
