//! Core of offgrid: an offline-first request fulfillment engine.
//!
//! This crate provides:
//! - Cache store with SQLite backend, partitioned into named generations
//! - Request classification and per-class fulfillment strategies
//! - Generation lifecycle (install population, activation pruning)
//! - Unified error types and layered configuration

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod generation;
pub mod network;
pub mod notify;
pub mod request;
pub mod response;
pub mod strategy;

pub use cache::{CacheDb, GenerationHandle, GenerationNames};
pub use classify::{Classifier, RequestClass, Route};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use generation::GenerationManager;
pub use network::Network;
pub use notify::{Broadcast, ChannelBroadcast, ClientMessage};
pub use request::{Request, RequestIdentity, RequestMode};
pub use response::{Response, ResponseSource};
pub use strategy::Engine;
