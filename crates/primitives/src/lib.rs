//! Primitive types shared by every crate of the child chain: byte buffers,
//! hashing and signature recovery, and the UTXO position codec.

#[macro_use]
mod macros;

pub mod buf;
pub mod constants;
pub mod crypto;
pub mod errors;
pub mod position;

#[cfg(feature = "test_utils")]
pub mod test_utils;

#[doc(hidden)]
pub mod __private {
    pub use {hex, serde};
}

pub mod prelude {
    pub use crate::{
        buf::{Address, Buf32, Signature},
        position::Position,
    };
}
