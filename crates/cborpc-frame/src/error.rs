use std::fmt;

/// The two serialized blocks that make up a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Header,
    Payload,
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Header => f.write_str("header"),
            Block::Payload => f.write_str("payload"),
        }
    }
}

/// Position inside a frame, used to report where a stream ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePart {
    HeaderLength,
    HeaderBlock,
    PayloadLength,
    PayloadBlock,
}

impl fmt::Display for FramePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramePart::HeaderLength => f.write_str("header length"),
            FramePart::HeaderBlock => f.write_str("header block"),
            FramePart::PayloadLength => f.write_str("payload length"),
            FramePart::PayloadBlock => f.write_str("payload block"),
        }
    }
}

/// Errors that can occur during frame encoding/decoding.
///
/// A stream that ends cleanly between frames is not an error; readers
/// report it as `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The stream ended inside a frame.
    #[error("truncated frame: stream closed in {part} ({received} of {expected} bytes)")]
    TruncatedFrame {
        part: FramePart,
        expected: usize,
        received: usize,
    },

    /// A block's bytes are not a valid serialized value of the expected shape.
    #[error("malformed {block} block: {message}")]
    MalformedBlock { block: Block, message: String },

    /// A value could not be serialized into a block.
    #[error("failed to encode {block} block: {message}")]
    Encode { block: Block, message: String },

    /// A block exceeds the configured maximum size.
    #[error("{block} block too large ({size} bytes, max {max})")]
    BlockTooLarge {
        block: Block,
        size: usize,
        max: usize,
    },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrameError>;
