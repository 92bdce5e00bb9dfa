//! Length-prefixed CBOR RPC over stdio and other byte streams.
//!
//! A frame is a 4-byte little-endian length and a CBOR header map, followed
//! by a 4-byte little-endian length and a CBOR payload. Requests carry
//! `ServiceMethod` and `Seq`; responses echo both and add `Error`.
//!
//! # Crate Structure
//!
//! - [`frame`]: Frame encoding/decoding over `Read`/`Write` streams
//! - [`rpc`]: Dispatcher, handlers, client, and child-process helpers

/// Re-export frame types.
pub mod frame {
    pub use cborpc_frame::*;
}

/// Re-export RPC types.
pub mod rpc {
    pub use cborpc_rpc::*;
}

pub use cborpc_rpc::{Client, Dispatcher, HandlerError, HandlerResult, Served, ServerCodec, Value};
