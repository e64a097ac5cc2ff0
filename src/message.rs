//! Command and response messages exchanged with a command channel.

use bytes::Bytes;
use std::fmt;
use uuid::Uuid;

/// Opaque message identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        MessageId(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        MessageId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Routing key a handler registers for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandName(String);

impl CommandName {
    pub fn new(name: impl Into<String>) -> Self {
        CommandName(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How many commands a registration accepts concurrently. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadFactor(u32);

impl LoadFactor {
    pub fn new(value: u32) -> Self {
        LoadFactor(value.max(1))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for LoadFactor {
    fn default() -> Self {
        LoadFactor(100)
    }
}

/// Payload bytes plus the metadata describing their encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedObject {
    pub payload_type: String,
    pub revision: String,
    pub data: Bytes,
}

impl SerializedObject {
    pub fn new(
        payload_type: impl Into<String>,
        revision: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        SerializedObject {
            payload_type: payload_type.into(),
            revision: revision.into(),
            data: data.into(),
        }
    }

    /// Copy of this object with the data replaced and the metadata kept.
    pub fn with_data(&self, data: impl Into<Bytes>) -> Self {
        SerializedObject {
            payload_type: self.payload_type.clone(),
            revision: self.revision.clone(),
            data: data.into(),
        }
    }
}

/// An inbound request routed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub message_id: MessageId,
    pub name: CommandName,
    pub payload: SerializedObject,
}

impl Command {
    /// Build a command with a freshly generated message id.
    pub fn new(name: CommandName, payload: SerializedObject) -> Self {
        Command {
            message_id: MessageId::generate(),
            name,
            payload,
        }
    }
}

/// The reply to a [`Command`], correlated through `request_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    pub message_id: MessageId,
    pub request_id: MessageId,
    pub payload: SerializedObject,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = MessageId::generate();
        let b = MessageId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_load_factor_never_zero() {
        assert_eq!(LoadFactor::new(0).get(), 1);
        assert_eq!(LoadFactor::new(7).get(), 7);
        assert_eq!(LoadFactor::default().get(), 100);
    }

    #[test]
    fn test_with_data_keeps_metadata() {
        let original = SerializedObject::new("ping", "1", "ping=1");
        let replaced = original.with_data("pong=1");
        assert_eq!(replaced.payload_type, "ping");
        assert_eq!(replaced.revision, "1");
        assert_eq!(&replaced.data[..], b"pong=1");
        assert_eq!(&original.data[..], b"ping=1");
    }
}
