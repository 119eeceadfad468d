//! CLI command implementations.

pub mod credentials;
pub mod generate;
