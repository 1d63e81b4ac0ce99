//! Database abstractions for the child chain.

pub mod batch;
mod errors;
pub mod traits;

pub use batch::{SpendWrite, StateBatch};
pub use errors::{DbError, DbResult};
