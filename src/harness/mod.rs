//! Test orchestration harness.
//!
//! [`IntegrationFixture`] is the lifecycle manager: it owns the application
//! context, auth session and database session of one test, initializes them
//! in dependency order and tears them down in reverse, draining the cleanup
//! path set along the way. [`await_completion`] is the bounded wait the
//! assertion layer builds on.

mod errors;
mod fixture;
mod logger;
mod wait;

pub use errors::{HarnessError, HarnessResult};
pub use fixture::{IntegrationFixture, INTEGRATION_TEST_ROOT_PATH};
pub use wait::{await_completion, process_events, GET_TOKEN_TIMEOUT};
