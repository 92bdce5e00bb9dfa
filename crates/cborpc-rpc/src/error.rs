use cborpc_frame::FrameError;

/// Errors that can occur in RPC operations.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Frame-level error (truncation, malformed block, I/O).
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The peer answered with a non-empty `Error` header.
    #[error("remote error: {0}")]
    Remote(String),

    /// The response does not carry the sequence number of the request.
    #[error("sequence mismatch (expected {expected}, received {received:?})")]
    SeqMismatch {
        expected: u64,
        received: ciborium::Value,
    },

    /// The reply payload does not have the shape the caller asked for.
    #[error("invalid reply: {0}")]
    InvalidReply(String),

    /// The stream ended while a response was outstanding.
    #[error("connection closed before a response arrived")]
    ConnectionClosed,

    /// The server process could not be started.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Process management I/O error.
    #[error("process I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RpcError>;
