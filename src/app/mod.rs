//! Application layer: CLI definition and configuration management.

pub mod cli;
pub mod config;
