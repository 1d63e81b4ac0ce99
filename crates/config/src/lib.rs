//! Node configuration loaded from TOML.

pub mod config;
pub mod rootchain;

pub use config::*;
