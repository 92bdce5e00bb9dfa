use std::collections::BTreeMap;

use ciborium::Value;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SERVICE_METHOD: &str = "ServiceMethod";
const SEQ: &str = "Seq";
const ERROR: &str = "Error";

/// Correlation and routing metadata carried in the header block.
///
/// Keys that are not modelled here are kept in `extra` and written back
/// unchanged, so a response header is the request header plus `Error`.
/// Header keys must be text.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Dot-qualified method name, e.g. `Arith.Multiply`.
    pub service_method: String,

    /// Caller-assigned request identifier, echoed back unchanged.
    ///
    /// Usually an unsigned integer, but any CBOR value is accepted.
    pub seq: Value,

    /// Present on responses only; empty means success.
    pub error: Option<String>,

    /// Any other header keys, passed through untouched.
    pub extra: BTreeMap<String, Value>,
}

impl Header {
    /// Create a request header.
    pub fn request(service_method: impl Into<String>, seq: u64) -> Self {
        Self {
            service_method: service_method.into(),
            seq: Value::Integer(seq.into()),
            error: None,
            extra: BTreeMap::new(),
        }
    }

    /// Turn a request header into the matching response header.
    ///
    /// An empty message marks success.
    pub fn into_response(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// The failure message, if this is a response that reports one.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|message| !message.is_empty())
    }

    /// `Seq` as an unsigned integer, if it is one.
    pub fn seq_number(&self) -> Option<u64> {
        match &self.seq {
            Value::Integer(int) => u64::try_from(*int).ok(),
            _ => None,
        }
    }
}

// Passthrough values go through `Value` untouched, so tags and integers
// outside the 64-bit range survive the echo.
impl Serialize for Header {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 2 + usize::from(self.error.is_some()) + self.extra.len();
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(SERVICE_METHOD, &self.service_method)?;
        map.serialize_entry(SEQ, &self.seq)?;
        if let Some(error) = &self.error {
            map.serialize_entry(ERROR, error)?;
        }
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Header {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Value::Map(entries) = Value::deserialize(deserializer)? else {
            return Err(D::Error::custom("header must be a map"));
        };

        let mut service_method = None;
        let mut seq = None;
        let mut error = None;
        let mut extra = BTreeMap::new();
        for (key, value) in entries {
            let Value::Text(key) = key else {
                return Err(D::Error::custom("header keys must be text"));
            };
            match key.as_str() {
                SERVICE_METHOD => match value {
                    Value::Text(method) => service_method = Some(method),
                    _ => return Err(D::Error::custom("ServiceMethod must be text")),
                },
                SEQ => seq = Some(value),
                ERROR => match value {
                    Value::Text(message) => error = Some(message),
                    Value::Null => error = None,
                    _ => return Err(D::Error::custom("Error must be text")),
                },
                _ => {
                    extra.insert(key, value);
                }
            }
        }

        Ok(Header {
            service_method: service_method
                .ok_or_else(|| D::Error::missing_field(SERVICE_METHOD))?,
            seq: seq.ok_or_else(|| D::Error::missing_field(SEQ))?,
            error,
            extra,
        })
    }
}

/// A decoded request frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub header: Header,
    pub args: Value,
}
