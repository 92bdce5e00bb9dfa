use std::io::{ErrorKind, Write};

use bytes::BytesMut;
use serde::Serialize;

use crate::block::encode_block;
use crate::codec::{encode_frame, Frame, FrameConfig};
use crate::error::{Block, FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete frames to any `Write` stream.
///
/// Every frame is flushed before the write call returns; nothing is held
/// back across frames.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.header.as_ref(), frame.payload.as_ref())
    }

    /// Serialize both blocks and send them as one frame.
    pub fn write_message<H, P>(&mut self, header: &H, payload: &P) -> Result<()>
    where
        H: Serialize + ?Sized,
        P: Serialize + ?Sized,
    {
        let header = encode_block(Block::Header, header)?;
        let payload = encode_block(Block::Payload, payload)?;
        self.send(&header, &payload)
    }

    /// Encode and send pre-serialized header and payload blocks.
    pub fn send(&mut self, header: &[u8], payload: &[u8]) -> Result<()> {
        self.check_size(Block::Header, header.len())?;
        self.check_size(Block::Payload, payload.len())?;

        self.buf.clear();
        encode_frame(header, payload, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        tracing::trace!(
            header_size = header.len(),
            payload_size = payload.len(),
            "frame written"
        );
        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    fn check_size(&self, block: Block, size: usize) -> Result<()> {
        if size > self.config.max_block_size {
            return Err(FrameError::BlockTooLarge {
                block,
                size,
                max: self.config.max_block_size,
            });
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum block size for subsequent frame encoding.
    pub fn set_max_block_size(&mut self, max_block_size: usize) {
        self.config.max_block_size = max_block_size;
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
