//! Subcommand implementations. Each writes its report to the given writer.

pub mod activate;
pub mod fetch;
pub mod generations;
pub mod install;
pub mod keys;
