//! SQLite-backed cache store partitioned into named generations.
//!
//! - Generations are created on open and deleted whole (entries cascade)
//! - Entries are keyed by a SHA-256 of the request identity
//! - Schema migrations run automatically on open
//! - WAL mode; all calls are serialized on one background connection

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use connection::CacheDb;
pub use generations::{GenerationHandle, GenerationInfo, GenerationNames};
