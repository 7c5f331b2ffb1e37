//! Test utilities shared across crate-level unit tests.

pub mod firebase;

pub use firebase::test_firebase_app;
