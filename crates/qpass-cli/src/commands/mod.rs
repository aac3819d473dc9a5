//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod generate;
pub mod version;
