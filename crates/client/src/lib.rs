//! Client code for offgrid.
//!
//! This crate provides the HTTP network the fulfillment engine fetches
//! through, shared by the server and CLI.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig};
