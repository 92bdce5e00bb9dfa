//! Handler trait and adapters.
//!
//! A handler takes the decoded payload of a request and either returns the
//! reply value or fails with a message. Plain closures over [`Value`] are
//! handlers; [`TypedHandler`] adds serde conversion on both sides.

use std::fmt::Display;
use std::marker::PhantomData;

use ciborium::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Result type for handler functions.
pub type HandlerResult = std::result::Result<Value, HandlerError>;

/// A handler failure, reported to the caller in the `Error` header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for HandlerError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for HandlerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Trait for method handlers.
pub trait Handler: Send + Sync + 'static {
    /// Handle a request with its decoded arguments.
    fn call(&self, args: Value) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(Value) -> HandlerResult + Send + Sync + 'static,
{
    fn call(&self, args: Value) -> HandlerResult {
        self(args)
    }
}

/// Wrapper that deserializes arguments and serializes the reply around a
/// strongly typed function.
pub struct TypedHandler<F, A, R, E> {
    handler: F,
    _phantom: PhantomData<fn(A) -> Result<R, E>>,
}

impl<F, A, R, E> TypedHandler<F, A, R, E>
where
    F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    R: Serialize + 'static,
    E: Display + 'static,
{
    /// Create a new typed handler.
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _phantom: PhantomData,
        }
    }
}

impl<F, A, R, E> Handler for TypedHandler<F, A, R, E>
where
    F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    A: DeserializeOwned + 'static,
    R: Serialize + 'static,
    E: Display + 'static,
{
    fn call(&self, args: Value) -> HandlerResult {
        let args: A = args
            .deserialized()
            .map_err(|err| HandlerError::new(format!("invalid arguments: {err}")))?;
        let reply = (self.handler)(args).map_err(|err| HandlerError::new(err.to_string()))?;
        Value::serialized(&reply)
            .map_err(|err| HandlerError::new(format!("failed to encode reply: {err}")))
    }
}
