use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;

use crate::app::FirebaseApp;

use super::errors::{AppCheckError, AppCheckResult};
use super::types::AppCheckToken;

/// Debug tokens live long enough that a non-forced request within a test
/// always hits the cache.
const DEBUG_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Ios,
    Android,
    Desktop,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Ios
        } else if cfg!(target_os = "android") {
            Platform::Android
        } else {
            Platform::Desktop
        }
    }
}

/// Attestation source abstraction. A provider is only ever constructed
/// through `ProviderKind::create`, which reports `None` on platforms where
/// the capability is absent.
#[async_trait]
pub trait AppCheckProvider: Send + Sync {
    async fn get_token(&self) -> AppCheckResult<AppCheckToken>;
}

/// Tagged variant over the platform provider factories. `create` is the
/// uniform "produce a provider for this context, or report unsupported"
/// operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    Debug,
    AppAttest,
    DeviceCheck,
    PlayIntegrity,
    SafetyNet,
}

impl ProviderKind {
    pub fn supported_on(self, platform: Platform) -> bool {
        match self {
            ProviderKind::Debug => true,
            ProviderKind::AppAttest | ProviderKind::DeviceCheck => platform == Platform::Ios,
            ProviderKind::PlayIntegrity | ProviderKind::SafetyNet => {
                platform == Platform::Android
            }
        }
    }

    pub fn create(self, app: &FirebaseApp) -> Option<Arc<dyn AppCheckProvider>> {
        if !self.supported_on(Platform::current()) {
            return None;
        }
        match self {
            ProviderKind::Debug => Some(Arc::new(DebugProvider::new(app))),
            ProviderKind::AppAttest => Some(Arc::new(AppAttestProvider)),
            ProviderKind::DeviceCheck => Some(Arc::new(DeviceCheckProvider)),
            ProviderKind::PlayIntegrity => Some(Arc::new(PlayIntegrityProvider)),
            ProviderKind::SafetyNet => Some(Arc::new(SafetyNetProvider)),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderKind::Debug => "debug",
            ProviderKind::AppAttest => "app-attest",
            ProviderKind::DeviceCheck => "device-check",
            ProviderKind::PlayIntegrity => "play-integrity",
            ProviderKind::SafetyNet => "safety-net",
        }
    }
}

/// Deterministic provider for integration runs. Every issuance produces a
/// fresh token whose expiry is strictly later than the previous one, so
/// forced refreshes are observably different even within one millisecond.
pub struct DebugProvider {
    app_name: String,
    secret: String,
    issued: AtomicU64,
}

impl DebugProvider {
    pub fn new(app: &FirebaseApp) -> Self {
        let mut rng = rand::thread_rng();
        let secret: String = (0..16)
            .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
            .collect();
        Self {
            app_name: app.name().to_owned(),
            secret,
            issued: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl AppCheckProvider for DebugProvider {
    async fn get_token(&self) -> AppCheckResult<AppCheckToken> {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let payload = format!("debug-{}-{}-{sequence}", self.app_name, self.secret);
        let ttl = DEBUG_TOKEN_TTL + Duration::from_millis(sequence);
        AppCheckToken::with_ttl(payload, ttl)
    }
}

/// Hardware attestation requires entitlements the harness app does not
/// carry; token requests complete with `UnsupportedProvider`.
pub struct AppAttestProvider;

#[async_trait]
impl AppCheckProvider for AppAttestProvider {
    async fn get_token(&self) -> AppCheckResult<AppCheckToken> {
        Err(AppCheckError::UnsupportedProvider {
            message: "App Attest is not available for this application".to_string(),
        })
    }
}

/// Device integrity checks fail generically on devices without the
/// capability; token requests complete with `Unknown`.
pub struct DeviceCheckProvider;

#[async_trait]
impl AppCheckProvider for DeviceCheckProvider {
    async fn get_token(&self) -> AppCheckResult<AppCheckToken> {
        Err(AppCheckError::Unknown {
            message: "DeviceCheck is not supported on this device".to_string(),
        })
    }
}

pub struct PlayIntegrityProvider;

#[async_trait]
impl AppCheckProvider for PlayIntegrityProvider {
    async fn get_token(&self) -> AppCheckResult<AppCheckToken> {
        Err(AppCheckError::Unknown {
            message: "Play Integrity attestation is unavailable in this environment".to_string(),
        })
    }
}

pub struct SafetyNetProvider;

#[async_trait]
impl AppCheckProvider for SafetyNetProvider {
    async fn get_token(&self) -> AppCheckResult<AppCheckToken> {
        Err(AppCheckError::Unknown {
            message: "SafetyNet attestation is unavailable in this environment".to_string(),
        })
    }
}
