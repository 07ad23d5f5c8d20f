//! Payload marshalling: turns opaque event data into the string the wire body carries.

use serde_json::Value;

use crate::error::NotifResult;

/// Serializes event payloads. Implementations must be deterministic and side-effect free.
pub trait DataMarshaller: Send + Sync {
    fn marshal(&self, data: &Value) -> NotifResult<String>;
}

/// JSON marshaller backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDataMarshaller;

impl DataMarshaller for DefaultDataMarshaller {
    fn marshal(&self, data: &Value) -> NotifResult<String> {
        Ok(serde_json::to_string(data)?)
    }
}
