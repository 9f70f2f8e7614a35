//! Command-line front end for hvrsync.
//!
//! The `hvrsync` binary is a thin wrapper around this library; the command
//! functions are exposed so they can be driven without spawning a process.

pub mod cli;
pub mod commands;

pub use cli::{Cli, Command};
pub use commands::{InspectReport, SyncSummary, run};
