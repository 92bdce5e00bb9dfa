//! Method dispatch over a single framed byte stream.
//!
//! A [`Dispatcher`] owns a table of named handlers and services one
//! request/response cycle at a time: it reads a request frame through a
//! [`ServerCodec`], routes it by `ServiceMethod`, and writes a response whose
//! header echoes the request with `Error` filled in. The [`Client`] and
//! [`ChildProcess`] types drive the other end of the same protocol.

pub mod client;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod header;
pub mod process;

pub use ciborium::Value;

pub use client::Client;
pub use codec::{ClientCodec, ServerCodec};
pub use dispatcher::{Dispatched, Dispatcher, Served};
pub use error::{Result, RpcError};
pub use handler::{Handler, HandlerError, HandlerResult, TypedHandler};
pub use header::{Header, Request};
pub use process::ChildProcess;
