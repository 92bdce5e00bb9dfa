//! CBOR serialization of header and payload blocks.
//!
//! Blocks are self-describing CBOR values (in practice, maps). A zero-length
//! block is valid and decodes as the empty map.

use ciborium::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Block, FrameError, Result};

/// Serialize a value into a CBOR block.
pub fn encode_block<T: Serialize + ?Sized>(block: Block, value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).map_err(|err| FrameError::Encode {
        block,
        message: err.to_string(),
    })?;
    Ok(buf)
}

/// Deserialize a CBOR block into a value.
///
/// The block must hold exactly one CBOR item; trailing bytes are rejected.
pub fn decode_block<T: DeserializeOwned>(block: Block, bytes: &[u8]) -> Result<T> {
    if bytes.is_empty() {
        return Value::Map(Vec::new())
            .deserialized()
            .map_err(|err| malformed(block, err));
    }

    let mut rest = bytes;
    let value = ciborium::from_reader(&mut rest).map_err(|err| malformed(block, err))?;
    if !rest.is_empty() {
        return Err(FrameError::MalformedBlock {
            block,
            message: format!("{} trailing bytes after value", rest.len()),
        });
    }
    Ok(value)
}

fn malformed(block: Block, err: impl std::fmt::Display) -> FrameError {
    FrameError::MalformedBlock {
        block,
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Args {
        #[serde(rename = "A")]
        a: i64,
        #[serde(rename = "B")]
        b: i64,
    }

    #[test]
    fn struct_encodes_as_named_map() {
        let bytes = encode_block(Block::Payload, &Args { a: 6, b: 7 }).unwrap();
        let value: Value = decode_block(Block::Payload, &bytes).unwrap();

        let map = value.as_map().expect("block should be a map");
        assert_eq!(map.len(), 2);
        assert_eq!(map[0].0, Value::Text("A".into()));
        assert_eq!(map[0].1, Value::Integer(6.into()));
    }

    #[test]
    fn decodes_typed_value() {
        let bytes = encode_block(Block::Payload, &Args { a: -3, b: 9 }).unwrap();
        let args: Args = decode_block(Block::Payload, &bytes).unwrap();
        assert_eq!(args, Args { a: -3, b: 9 });
    }

    #[test]
    fn empty_map_is_one_byte() {
        let bytes = encode_block(Block::Header, &BTreeMap::<String, Value>::new()).unwrap();
        assert_eq!(bytes, vec![0xA0]);
    }

    #[test]
    fn zero_length_block_decodes_as_empty_map() {
        let map: BTreeMap<String, Value> = decode_block(Block::Payload, &[]).unwrap();
        assert!(map.is_empty());

        let value: Value = decode_block(Block::Payload, &[]).unwrap();
        assert_eq!(value, Value::Map(Vec::new()));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = decode_block::<Value>(Block::Header, &[0xFF, 0xFF]).unwrap_err();
        assert!(matches!(
            err,
            FrameError::MalformedBlock {
                block: Block::Header,
                ..
            }
        ));
    }

    #[test]
    fn truncated_item_is_malformed() {
        // map(1) with a key but no value
        let err = decode_block::<Value>(Block::Payload, &[0xA1, 0x61, b'A']).unwrap_err();
        assert!(matches!(err, FrameError::MalformedBlock { .. }));
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let err = decode_block::<Value>(Block::Payload, &[0xA0, 0xA0]).unwrap_err();
        match err {
            FrameError::MalformedBlock { message, .. } => {
                assert!(message.contains("1 trailing bytes"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_shape_is_malformed() {
        let bytes = encode_block(Block::Payload, &"just a string").unwrap();
        let err = decode_block::<Args>(Block::Payload, &bytes).unwrap_err();
        assert!(matches!(err, FrameError::MalformedBlock { .. }));
    }
}
