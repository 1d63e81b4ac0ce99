//! Utilities shared by the node binary and its crates.

pub mod logging;
