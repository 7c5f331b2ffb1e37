//! Integration test harness for the Firebase App Check attestation flow.
//!
//! The crate bundles a thin, self-contained SDK surface (application context,
//! anonymous auth session, in-memory realtime database, App Check façade) and
//! a test orchestration harness that drives it the way the platform
//! integration suites do: configure an attestation provider, initialize app,
//! auth and database in dependency order, request and observe tokens, then
//! tear everything down in reverse order.
//!
//! The scenario suite itself lives under `tests/`.

pub mod app;
pub mod app_check;
pub mod auth;
pub mod database;
pub mod harness;
pub mod logger;

#[cfg(test)]
pub mod test_support;
