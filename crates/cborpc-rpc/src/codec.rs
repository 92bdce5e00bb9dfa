//! Request/response views over a pair of frame streams.

use std::io::{Read, Write};

use cborpc_frame::{encode_block, Block, FrameConfig, FrameReader, FrameWriter};
use ciborium::Value;
use serde::Serialize;

use crate::error::Result;
use crate::header::{Header, Request};

/// Server side of a connection: reads requests, writes responses.
pub struct ServerCodec<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
}

impl<R: Read, W: Write> ServerCodec<R, W> {
    /// Create a codec with default frame configuration.
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, FrameConfig::default())
    }

    /// Create a codec with explicit frame configuration.
    pub fn with_config(reader: R, writer: W, config: FrameConfig) -> Self {
        Self {
            reader: FrameReader::with_config(reader, config.clone()),
            writer: FrameWriter::with_config(writer, config),
        }
    }

    /// Read the next request. `Ok(None)` means the stream ended cleanly.
    pub fn read_request(&mut self) -> Result<Option<Request>> {
        let Some((header, args)) = self.reader.read_message::<Header, Value>()? else {
            return Ok(None);
        };
        Ok(Some(Request { header, args }))
    }

    /// Write a response frame and flush it.
    pub fn write_response(&mut self, header: &Header, reply: &Value) -> Result<()> {
        self.writer.write_message(header, reply)?;
        Ok(())
    }

    /// Write a response whose payload block is already encoded.
    pub fn write_response_block(&mut self, header: &Header, payload: &[u8]) -> Result<()> {
        let header = encode_block(Block::Header, header)?;
        self.writer.send(&header, payload)?;
        Ok(())
    }

    /// Largest block this codec will write.
    pub fn max_block_size(&self) -> usize {
        self.writer.config().max_block_size
    }

    /// Consume the codec and return the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader.into_inner(), self.writer.into_inner())
    }
}

/// Client side of a connection: writes requests, reads responses.
pub struct ClientCodec<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
}

impl<R: Read, W: Write> ClientCodec<R, W> {
    /// Create a codec with default frame configuration.
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, FrameConfig::default())
    }

    /// Create a codec with explicit frame configuration.
    pub fn with_config(reader: R, writer: W, config: FrameConfig) -> Self {
        Self {
            reader: FrameReader::with_config(reader, config.clone()),
            writer: FrameWriter::with_config(writer, config),
        }
    }

    /// Write a request frame and flush it.
    pub fn write_request<A: Serialize + ?Sized>(&mut self, header: &Header, args: &A) -> Result<()> {
        self.writer.write_message(header, args)?;
        Ok(())
    }

    /// Read the next response. `Ok(None)` means the stream ended cleanly.
    pub fn read_response(&mut self) -> Result<Option<(Header, Value)>> {
        Ok(self.reader.read_message::<Header, Value>()?)
    }

    /// Consume the codec and return the underlying streams.
    pub fn into_inner(self) -> (R, W) {
        (self.reader.into_inner(), self.writer.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::RpcError;
    use cborpc_frame::FrameError;

    fn args(a: i64, b: i64) -> Value {
        Value::Map(vec![
            (Value::Text("A".into()), Value::Integer(a.into())),
            (Value::Text("B".into()), Value::Integer(b.into())),
        ])
    }

    #[test]
    fn request_written_by_client_is_read_by_server() {
        let mut client = ClientCodec::new(std::io::empty(), Vec::new());
        client
            .write_request(&Header::request("Arith.Multiply", 1), &args(6, 7))
            .unwrap();
        let (_, wire) = client.into_inner();

        let mut server = ServerCodec::new(Cursor::new(wire), std::io::sink());
        let request = server.read_request().unwrap().unwrap();

        assert_eq!(request.header, Header::request("Arith.Multiply", 1));
        assert_eq!(request.args, args(6, 7));
        assert!(server.read_request().unwrap().is_none());
    }

    #[test]
    fn response_written_by_server_is_read_by_client() {
        let mut server = ServerCodec::new(std::io::empty(), Vec::new());
        let header = Header::request("Arith.Multiply", 5).into_response("");
        server
            .write_response(&header, &Value::Integer(42.into()))
            .unwrap();
        let (_, wire) = server.into_inner();

        let mut client = ClientCodec::new(Cursor::new(wire), std::io::sink());
        let (decoded, reply) = client.read_response().unwrap().unwrap();

        assert_eq!(decoded, header);
        assert_eq!(reply, Value::Integer(42.into()));
        assert!(client.read_response().unwrap().is_none());
    }

    #[test]
    fn truncated_request_is_an_error() {
        let mut server = ServerCodec::new(Cursor::new(vec![8, 0, 0, 0]), std::io::sink());
        let err = server.read_request().unwrap_err();
        assert!(matches!(
            err,
            RpcError::Frame(FrameError::TruncatedFrame { .. })
        ));
    }
}
