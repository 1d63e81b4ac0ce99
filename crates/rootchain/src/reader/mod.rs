//! Follows contract events behind the finality window.

mod state;
mod task;

pub(crate) use state::ReaderState;
pub(crate) use task::{reader_task, ReaderCtx};
