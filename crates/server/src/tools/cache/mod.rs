//! Cache lifecycle MCP tools.
//!
//! This module provides tools for installing, activating, and inspecting
//! cache generations.

pub mod activate;
pub mod generations;
pub mod get;
pub mod install;
pub mod sync;

pub use activate::activate_impl;
pub use generations::generations_impl;
pub use get::{CacheGetParams, get_impl};
pub use install::{CacheInstallParams, install_impl};
pub use sync::{CacheSyncParams, sync_impl};
