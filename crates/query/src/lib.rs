//! Read-only queries over the child chain store.

mod errors;
mod service;
mod types;

pub use errors::{QueryError, QueryResult};
pub use service::{QueryService, MAX_BLOCKS_PER_QUERY};
pub use types::{BlockInfo, BlocksResponse, OutputInfo};
