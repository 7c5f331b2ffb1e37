//! App Check attestation façade.
//!
//! Provider selection is an explicit [`AppCheckOptions`] value handed to
//! [`AppCheck::new`] together with the application context; provider
//! factories are the [`ProviderKind`] tagged variant whose `create` either
//! yields a provider or reports the capability absent for the current
//! platform. The façade caches the current token, refreshes on demand, and
//! notifies token-changed listeners exactly once per successful change.

mod errors;
mod facade;
mod logger;
mod providers;
mod types;

pub use errors::{AppCheckError, AppCheckResult};
pub use facade::AppCheck;
pub use providers::{
    AppAttestProvider, AppCheckProvider, DebugProvider, DeviceCheckProvider, Platform,
    PlayIntegrityProvider, ProviderKind, SafetyNetProvider,
};
pub use types::{AppCheckListener, AppCheckOptions, AppCheckToken, ListenerHandle};
