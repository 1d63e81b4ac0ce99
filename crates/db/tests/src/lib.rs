//! Backend-independent test suites for the database traits.
//!
//! Each module exposes plain functions taking a database or backend handle,
//! and an exported macro generating `#[test]` wrappers around them for a
//! concrete backend.

pub mod backend_tests;
pub mod plasma_tests;
pub mod utxo_tests;
