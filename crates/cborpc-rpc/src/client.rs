use std::io::{Read, Write};

use cborpc_frame::FrameConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::ClientCodec;
use crate::error::{Result, RpcError};
use crate::header::Header;

/// Synchronous RPC client: one call in flight at a time.
pub struct Client<R, W> {
    codec: ClientCodec<R, W>,
    next_seq: u64,
}

impl<R: Read, W: Write> Client<R, W> {
    /// Create a client over a reader/writer pair.
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, FrameConfig::default())
    }

    /// Create a client with explicit frame configuration.
    pub fn with_config(reader: R, writer: W, config: FrameConfig) -> Self {
        Self {
            codec: ClientCodec::with_config(reader, writer, config),
            next_seq: 0,
        }
    }

    /// Call `method` and wait for its reply.
    ///
    /// A non-empty `Error` header becomes [`RpcError::Remote`].
    pub fn call<A, T>(&mut self, method: &str, args: &A) -> Result<T>
    where
        A: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);

        self.codec.write_request(&Header::request(method, seq), args)?;
        let (header, reply) = self
            .codec
            .read_response()?
            .ok_or(RpcError::ConnectionClosed)?;

        if header.seq_number() != Some(seq) {
            return Err(RpcError::SeqMismatch {
                expected: seq,
                received: header.seq,
            });
        }
        if let Some(message) = header.error_message() {
            return Err(RpcError::Remote(message.to_string()));
        }

        reply
            .deserialized()
            .map_err(|err| RpcError::InvalidReply(err.to_string()))
    }

    /// Sequence number the next call will use.
    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Consume the client and return the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        self.codec.into_inner()
    }
}
