//! CLI driver for the consistent hash ring.
//!
//! Provides commands for:
//! - Simulating node joins and leaves over a fixed key set
//! - Reporting load distribution statistics
//! - Looking up key owners
//! - Demonstrating key store migration

pub mod commands;
pub mod config;
pub mod logging;
pub mod report;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
