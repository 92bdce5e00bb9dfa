use std::collections::HashMap;
use std::fmt::Display;
use std::io::{Read, Write};
use std::panic::{catch_unwind, AssertUnwindSafe};

use cborpc_frame::{encode_block, Block};
use ciborium::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::ServerCodec;
use crate::error::Result;
use crate::handler::{Handler, HandlerError, HandlerResult, TypedHandler};
use crate::header::{Header, Request};

/// Outcome of one service cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Served {
    /// A request was answered; the loop may continue.
    Dispatched(Dispatched),
    /// The stream ended between frames; the loop should stop.
    EndOfStream,
}

/// What was answered, for the caller to log.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatched {
    pub method: String,
    pub seq: Value,
    /// The error sent back, if the call failed.
    pub error: Option<String>,
}

/// Routes requests to handlers by method name.
///
/// Registration happens through `&mut self` and dispatch through `&self`, so
/// the table cannot change while a request is being serviced.
#[derive(Default)]
pub struct Dispatcher {
    methods: HashMap<String, Box<dyn Handler>>,
}

impl Dispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler, replacing any previous handler of the same name.
    pub fn register(&mut self, name: impl Into<String>, handler: impl Handler) -> &mut Self {
        self.methods.insert(name.into(), Box::new(handler));
        self
    }

    /// Register a strongly typed function.
    ///
    /// Arguments that do not deserialize into `A` fail the call without
    /// reaching `f`.
    pub fn register_fn<F, A, R, E>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(A) -> std::result::Result<R, E> + Send + Sync + 'static,
        A: DeserializeOwned + 'static,
        R: Serialize + 'static,
        E: Display + 'static,
    {
        self.register(name, TypedHandler::new(f))
    }

    /// Remove a handler. Returns whether one was registered.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.methods.remove(name).is_some()
    }

    /// Returns true if a handler is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Returns true if no methods are registered.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Invoke the handler for `method`.
    ///
    /// Unknown methods and panicking handlers are reported as errors, never
    /// propagated.
    pub fn call(&self, method: &str, args: Value) -> HandlerResult {
        let Some(handler) = self.methods.get(method) else {
            return Err(HandlerError::new(format!("rpc: can't find method {method}")));
        };

        match catch_unwind(AssertUnwindSafe(|| handler.call(args))) {
            Ok(result) => result,
            Err(panic) => Err(HandlerError::new(format!(
                "handler panicked: {}",
                panic_message(panic.as_ref())
            ))),
        }
    }

    /// Answer a decoded request: the response header is the request header
    /// with `Error` set, the payload is the reply (or an empty map on failure).
    pub fn handle(&self, request: Request) -> (Header, Value) {
        let Request { header, args } = request;
        match self.call(&header.service_method, args) {
            Ok(reply) => (header.into_response(""), reply),
            Err(err) => (header.into_response(err.message()), Value::Map(Vec::new())),
        }
    }

    /// Read one request, dispatch it, and write the response.
    ///
    /// Frame errors (truncation, malformed blocks, I/O) are returned as-is;
    /// no response is written for them. A reply that does not fit in one
    /// block is answered with an error instead.
    pub fn service_one<R: Read, W: Write>(&self, codec: &mut ServerCodec<R, W>) -> Result<Served> {
        let Some(request) = codec.read_request()? else {
            return Ok(Served::EndOfStream);
        };

        let (mut header, reply) = self.handle(request);
        let mut payload = encode_block(Block::Payload, &reply)?;
        let max = codec.max_block_size();
        if payload.len() > max {
            header.error = Some(format!(
                "reply too large: {} bytes (max {max})",
                payload.len()
            ));
            payload = encode_block(Block::Payload, &Value::Map(Vec::new()))?;
        }
        codec.write_response_block(&header, &payload)?;

        Ok(Served::Dispatched(Dispatched {
            error: header.error_message().map(str::to_string),
            method: header.service_method,
            seq: header.seq,
        }))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}
