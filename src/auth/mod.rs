//! Anonymous authentication session, enough surface for the harness to sign
//! a test user in before database work and clean the account up afterwards.

mod api;
mod error;

pub use api::{Auth, User};
pub use error::{AuthError, AuthResult};
