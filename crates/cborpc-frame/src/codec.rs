use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Block, FrameError, FramePart, Result};

/// Each block is preceded by a 4-byte little-endian length.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Default maximum block size: 16 MiB.
pub const DEFAULT_MAX_BLOCK: usize = 16 * 1024 * 1024;

/// A raw frame: the serialized header and payload blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The serialized header block.
    pub header: Bytes,
    /// The serialized payload block.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(header: impl Into<Bytes>, payload: impl Into<Bytes>) -> Self {
        Self {
            header: header.into(),
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (both prefixes + both blocks).
    pub fn wire_size(&self) -> usize {
        2 * LENGTH_PREFIX_SIZE + self.header.len() + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────┬──────────────┬─────────────┬───────────────┐
/// │ HeaderLen  │ Header       │ PayloadLen  │ Payload       │
/// │ (4B LE)    │ (HeaderLen)  │ (4B LE)     │ (PayloadLen)  │
/// └────────────┴──────────────┴─────────────┴───────────────┘
/// ```
pub fn encode_frame(header: &[u8], payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    let header_len = wire_len(Block::Header, header)?;
    let payload_len = wire_len(Block::Payload, payload)?;

    dst.reserve(2 * LENGTH_PREFIX_SIZE + header.len() + payload.len());
    dst.put_u32_le(header_len);
    dst.put_slice(header);
    dst.put_u32_le(payload_len);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer. Declared block
/// lengths above `max_block` are rejected before waiting for the block.
pub fn decode_frame(src: &mut BytesMut, max_block: usize) -> Result<Option<Frame>> {
    let Some(header_len) = read_len(src, 0) else {
        return Ok(None);
    };
    check_limit(Block::Header, header_len, max_block)?;

    let payload_prefix = LENGTH_PREFIX_SIZE + header_len;
    let Some(payload_len) = read_len(src, payload_prefix) else {
        return Ok(None);
    };
    check_limit(Block::Payload, payload_len, max_block)?;

    let total = payload_prefix + LENGTH_PREFIX_SIZE + payload_len;
    if src.len() < total {
        return Ok(None);
    }

    src.advance(LENGTH_PREFIX_SIZE);
    let header = src.split_to(header_len).freeze();
    src.advance(LENGTH_PREFIX_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { header, payload }))
}

/// Describe how far an incomplete frame got before the stream ended.
pub(crate) fn truncation(src: &[u8]) -> FrameError {
    let truncated = |part, expected, received| FrameError::TruncatedFrame {
        part,
        expected,
        received,
    };

    let Some(header_len) = read_len(src, 0) else {
        return truncated(FramePart::HeaderLength, LENGTH_PREFIX_SIZE, src.len());
    };
    let after_prefix = src.len() - LENGTH_PREFIX_SIZE;
    if after_prefix < header_len {
        return truncated(FramePart::HeaderBlock, header_len, after_prefix);
    }

    let payload_prefix = LENGTH_PREFIX_SIZE + header_len;
    let Some(payload_len) = read_len(src, payload_prefix) else {
        return truncated(
            FramePart::PayloadLength,
            LENGTH_PREFIX_SIZE,
            src.len() - payload_prefix,
        );
    };
    let received = src.len() - payload_prefix - LENGTH_PREFIX_SIZE;
    truncated(FramePart::PayloadBlock, payload_len, received.min(payload_len))
}

fn read_len(src: &[u8], at: usize) -> Option<usize> {
    let bytes = src.get(at..at.checked_add(LENGTH_PREFIX_SIZE)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize)
}

fn wire_len(block: Block, bytes: &[u8]) -> Result<u32> {
    u32::try_from(bytes.len()).map_err(|_| FrameError::BlockTooLarge {
        block,
        size: bytes.len(),
        max: u32::MAX as usize,
    })
}

fn check_limit(block: Block, size: usize, max: usize) -> Result<()> {
    if size > max {
        return Err(FrameError::BlockTooLarge { block, size, max });
    }
    Ok(())
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum size of a single block in bytes. Default: 16 MiB.
    pub max_block_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_block_size: DEFAULT_MAX_BLOCK,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        encode_frame(b"head", b"payload bytes", &mut buf).unwrap();

        assert_eq!(buf.len(), 2 * LENGTH_PREFIX_SIZE + 4 + 13);

        let frame = decode_frame(&mut buf, DEFAULT_MAX_BLOCK).unwrap().unwrap();

        assert_eq!(frame.header.as_ref(), b"head");
        assert_eq!(frame.payload.as_ref(), b"payload bytes");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_wire_layout_is_little_endian() {
        let mut buf = BytesMut::new();
        encode_frame(&[0xAA; 3], &[0xBB; 258], &mut buf).unwrap();

        assert_eq!(&buf[0..4], &[3, 0, 0, 0]);
        assert_eq!(&buf[4..7], &[0xAA; 3]);
        assert_eq!(&buf[7..11], &[2, 1, 0, 0]);
        assert_eq!(buf.len(), 11 + 258);
    }

    #[test]
    fn test_decode_incomplete_length_prefix() {
        let mut buf = BytesMut::from(&[0x05, 0x00][..]);
        let result = decode_frame(&mut buf, DEFAULT_MAX_BLOCK).unwrap();
        assert!(result.is_none());
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b"h", b"hello", &mut buf).unwrap();
        buf.truncate(buf.len() - 2);

        let result = decode_frame(&mut buf, DEFAULT_MAX_BLOCK).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_header_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(1024 * 1024 * 32);

        let result = decode_frame(&mut buf, DEFAULT_MAX_BLOCK);
        assert!(matches!(
            result,
            Err(FrameError::BlockTooLarge {
                block: Block::Header,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_payload_too_large() {
        let mut buf = BytesMut::new();
        buf.put_u32_le(1);
        buf.put_u8(0xA0);
        buf.put_u32_le(64);

        let result = decode_frame(&mut buf, 16);
        assert!(matches!(
            result,
            Err(FrameError::BlockTooLarge {
                block: Block::Payload,
                size: 64,
                max: 16
            })
        ));
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(b"h1", b"first", &mut buf).unwrap();
        encode_frame(b"h2", b"second", &mut buf).unwrap();

        let f1 = decode_frame(&mut buf, DEFAULT_MAX_BLOCK).unwrap().unwrap();
        assert_eq!(f1.header.as_ref(), b"h1");
        assert_eq!(f1.payload.as_ref(), b"first");

        let f2 = decode_frame(&mut buf, DEFAULT_MAX_BLOCK).unwrap().unwrap();
        assert_eq!(f2.header.as_ref(), b"h2");
        assert_eq!(f2.payload.as_ref(), b"second");

        assert!(buf.is_empty());
    }

    #[test]
    fn test_zero_length_blocks() {
        let mut buf = BytesMut::new();
        encode_frame(b"", b"", &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0u8; 8]);

        let frame = decode_frame(&mut buf, DEFAULT_MAX_BLOCK).unwrap().unwrap();
        assert!(frame.header.is_empty());
        assert!(frame.payload.is_empty());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_frame_wire_size() {
        let frame = Frame::new(Bytes::from_static(b"ab"), Bytes::from_static(b"test"));
        assert_eq!(frame.wire_size(), 2 * LENGTH_PREFIX_SIZE + 6);
    }

    #[test]
    fn test_truncation_reports_part() {
        let mut wire = BytesMut::new();
        encode_frame(b"head", b"body", &mut wire).unwrap();

        let cases = [
            (2, FramePart::HeaderLength, 4, 2),
            (4, FramePart::HeaderBlock, 4, 0),
            (6, FramePart::HeaderBlock, 4, 2),
            (9, FramePart::PayloadLength, 4, 1),
            (14, FramePart::PayloadBlock, 4, 2),
        ];
        for (len, part, expected, received) in cases {
            match truncation(&wire[..len]) {
                FrameError::TruncatedFrame {
                    part: p,
                    expected: e,
                    received: r,
                } => assert_eq!((p, e, r), (part, expected, received), "prefix {len}"),
                other => panic!("unexpected error: {other}"),
            }
        }
    }
}
