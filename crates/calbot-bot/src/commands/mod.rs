//! CLI subcommand implementations.

pub mod config;
