//! Publishable events: the value types a trigger request is built from.

use serde_json::Value;

/// A single event published to one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    channel: String,
    event_name: String,
    data: Value,
    socket_id: Option<String>,
}

impl Event {
    pub fn new(channel: impl Into<String>, event_name: impl Into<String>, data: Value) -> Self {
        Self {
            channel: channel.into(),
            event_name: event_name.into(),
            data,
            socket_id: None,
        }
    }

    /// Exclude the connection identified by `socket_id` from delivery.
    pub fn with_socket_id(mut self, socket_id: impl Into<String>) -> Self {
        self.socket_id = Some(socket_id.into());
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn event_name(&self) -> &str {
        &self.event_name
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn socket_id(&self) -> Option<&str> {
        self.socket_id.as_deref()
    }
}

/// An event carrying a second payload for delivery paths that cannot take `data`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackupDataEvent {
    event: Event,
    backup_data: Value,
}

impl BackupDataEvent {
    pub fn new(event: Event, backup_data: Value) -> Self {
        Self { event, backup_data }
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn backup_data(&self) -> &Value {
        &self.backup_data
    }
}

/// What a trigger request publishes.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishRequest {
    Plain(Event),
    WithBackup(BackupDataEvent),
}

impl PublishRequest {
    pub fn event(&self) -> &Event {
        match self {
            PublishRequest::Plain(event) => event,
            PublishRequest::WithBackup(backup) => backup.event(),
        }
    }

    pub fn backup_data(&self) -> Option<&Value> {
        match self {
            PublishRequest::Plain(_) => None,
            PublishRequest::WithBackup(backup) => Some(backup.backup_data()),
        }
    }

    pub fn channel(&self) -> &str {
        self.event().channel()
    }

    pub fn event_name(&self) -> &str {
        self.event().event_name()
    }

    pub fn data(&self) -> &Value {
        self.event().data()
    }

    pub fn socket_id(&self) -> Option<&str> {
        self.event().socket_id()
    }
}

impl From<Event> for PublishRequest {
    fn from(event: Event) -> Self {
        PublishRequest::Plain(event)
    }
}

impl From<BackupDataEvent> for PublishRequest {
    fn from(event: BackupDataEvent) -> Self {
        PublishRequest::WithBackup(event)
    }
}
