//! Length-prefixed header/payload framing for stream RPC.
//!
//! Every frame on the wire is two blocks, each preceded by its length:
//! - A 4-byte little-endian header length, then the CBOR header block
//! - A 4-byte little-endian payload length, then the CBOR payload block
//!
//! Requests and responses share the same shape. The framing layer never
//! looks inside a block beyond its byte length; [`block`] turns blocks into
//! typed values.

pub mod block;
pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use block::{decode_block, encode_block};
pub use codec::{decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_BLOCK, LENGTH_PREFIX_SIZE};
pub use error::{Block, FrameError, FramePart, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
