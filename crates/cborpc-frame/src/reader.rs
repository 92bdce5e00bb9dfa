use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use serde::de::DeserializeOwned;

use crate::block::decode_block;
use crate::codec::{decode_frame, truncation, Frame, FrameConfig};
use crate::error::{Block, FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Partial reads are buffered internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Ok(None)` when the stream ends before the first byte of a
    /// frame, and `Err(FrameError::TruncatedFrame)` when it ends inside one.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf, self.config.max_block_size)? {
                tracing::trace!(
                    header_size = frame.header.len(),
                    payload_size = frame.payload.len(),
                    "frame read"
                );
                return Ok(Some(frame));
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(truncation(&self.buf));
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    /// Read the next frame and deserialize both blocks.
    pub fn read_message<H, P>(&mut self) -> Result<Option<(H, P)>>
    where
        H: DeserializeOwned,
        P: DeserializeOwned,
    {
        let Some(frame) = self.read_frame()? else {
            return Ok(None);
        };
        let header = decode_block(Block::Header, &frame.header)?;
        let payload = decode_block(Block::Payload, &frame.payload)?;
        Ok(Some((header, payload)))
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum block size for subsequent frame decoding.
    pub fn set_max_block_size(&mut self, max_block_size: usize) {
        self.config.max_block_size = max_block_size;
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
