//! Realtime-database session over an in-memory JSON tree: child references,
//! push-id generation, reads/writes, and read-modify-write transactions.
//! Enough surface to exercise how attestation gating interacts with database
//! traffic without a live backend.

mod api;
mod error;
mod push_id;

pub use api::{Database, DatabaseReference, DataSnapshot, MutableData, TransactionResult};
pub use error::{DatabaseError, DatabaseErrorCode, DatabaseResult};
