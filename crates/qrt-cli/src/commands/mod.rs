//! CLI command implementations.

pub mod account;
pub mod backends;
pub mod common;
pub mod estimate;
pub mod run;
pub mod sample;
pub mod version;
