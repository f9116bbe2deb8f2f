//! CLI command implementations.

pub mod config;
pub mod token;
pub mod version;
