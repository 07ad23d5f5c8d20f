//! Trigger request building: validate, marshal, and shape the publish body.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{NotifError, NotifResult};
use crate::marshaller::{DataMarshaller, DefaultDataMarshaller};
use crate::models::event::PublishRequest;
use crate::validation;

/// Largest marshalled payload the service accepts.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 10 * 1024;
/// Channels a single trigger may target.
pub const MAX_TRIGGER_CHANNELS: usize = 100;
/// Events a batch trigger may carry.
pub const MAX_BATCH_EVENTS: usize = 10;
pub const MAX_EVENT_NAME_BYTES: usize = 200;

/// Body of `POST /apps/{app_id}/events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerBody {
    pub name: String,
    pub channels: Vec<String>,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
}

/// One entry of `POST /apps/{app_id}/batch_events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEvent {
    pub channel: String,
    pub name: String,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchBody {
    pub batch: Vec<BatchEvent>,
}

/// A validated request ready for the signing layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerRequest<B> {
    pub path: String,
    /// Caller-supplied query parameters; never contains a reserved key.
    pub query: BTreeMap<String, String>,
    pub body: B,
}

/// Builds publish bodies. Holds no mutable state and may be shared across threads.
#[derive(Clone)]
pub struct TriggerBuilder {
    app_id: String,
    marshaller: Arc<dyn DataMarshaller>,
    max_payload_bytes: usize,
    query: BTreeMap<String, String>,
}

impl TriggerBuilder {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self::with_marshaller(app_id, Arc::new(DefaultDataMarshaller))
    }

    pub fn with_marshaller(
        app_id: impl Into<String>,
        marshaller: Arc<dyn DataMarshaller>,
    ) -> Self {
        Self {
            app_id: app_id.into(),
            marshaller,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
            query: BTreeMap::new(),
        }
    }

    pub fn max_payload_bytes(mut self, max: usize) -> Self {
        self.max_payload_bytes = max;
        self
    }

    /// Extra query parameters sent with every request. Reserved signature keys are rejected.
    pub fn with_query_params(mut self, params: BTreeMap<String, String>) -> NotifResult<Self> {
        validation::require_no_reserved_keys(&params)?;
        self.query = params;
        Ok(self)
    }

    /// Publish one event to its own channel.
    #[instrument(
        skip(self, request),
        fields(channel = %request.channel(), event = %request.event_name())
    )]
    pub fn build(&self, request: &PublishRequest) -> NotifResult<TriggerRequest<TriggerBody>> {
        validation::require_valid_channel(request.channel())?;
        let data = self.checked_payload(request)?;
        let body = TriggerBody {
            name: request.event_name().to_string(),
            channels: vec![request.channel().to_string()],
            data,
            socket_id: request.socket_id().map(str::to_string),
        };
        info!(bytes = body.data.len(), "trigger built");
        Ok(self.request("events", body))
    }

    /// Publish one event to several channels. The event's own channel is ignored.
    #[instrument(
        skip(self, channels, request),
        fields(event = %request.event_name(), count = channels.len())
    )]
    pub fn build_multi<S: AsRef<str>>(
        &self,
        channels: &[S],
        request: &PublishRequest,
    ) -> NotifResult<TriggerRequest<TriggerBody>> {
        validation::require_max_length("channels", MAX_TRIGGER_CHANNELS, channels)?;
        if channels.is_empty() {
            return Err(NotifError::invalid("Parameter [channels] must not be empty"));
        }
        validation::require_valid_channels(channels)?;
        let data = self.checked_payload(request)?;
        let body = TriggerBody {
            name: request.event_name().to_string(),
            channels: channels.iter().map(|c| c.as_ref().to_string()).collect(),
            data,
            socket_id: request.socket_id().map(str::to_string),
        };
        info!(bytes = body.data.len(), "trigger built");
        Ok(self.request("events", body))
    }

    /// Publish several events, each to its own channel, in one request.
    #[instrument(skip(self, requests), fields(count = requests.len()))]
    pub fn build_batch(
        &self,
        requests: &[PublishRequest],
    ) -> NotifResult<TriggerRequest<BatchBody>> {
        validation::require_max_length("batch", MAX_BATCH_EVENTS, requests)?;
        if requests.is_empty() {
            return Err(NotifError::invalid("Parameter [batch] must not be empty"));
        }
        let batch = requests
            .iter()
            .map(|request| {
                validation::require_valid_channel(request.channel())?;
                Ok(BatchEvent {
                    channel: request.channel().to_string(),
                    name: request.event_name().to_string(),
                    data: self.checked_payload(request)?,
                    socket_id: request.socket_id().map(str::to_string),
                })
            })
            .collect::<NotifResult<Vec<_>>>()?;
        info!("batch trigger built");
        Ok(self.request("batch_events", BatchBody { batch }))
    }

    /// Event name, socket id and payload checks shared by every build path.
    fn checked_payload(&self, request: &PublishRequest) -> NotifResult<String> {
        let name = validation::require_non_empty("eventName", Some(request.event_name()))?;
        if name.len() > MAX_EVENT_NAME_BYTES {
            return Err(NotifError::invalid(format!(
                "Parameter [eventName] must be at most {} bytes",
                MAX_EVENT_NAME_BYTES
            )));
        }
        validation::require_valid_socket_id(request.socket_id())?;

        let data = self.marshaller.marshal(request.data())?;
        if data.len() <= self.max_payload_bytes {
            return Ok(data);
        }

        let Some(backup) = request.backup_data() else {
            return Err(self.oversized("data", data.len()));
        };
        debug!(bytes = data.len(), "data too large, using backup data");
        let backup = self.marshaller.marshal(backup)?;
        if backup.len() > self.max_payload_bytes {
            return Err(self.oversized("backupData", backup.len()));
        }
        Ok(backup)
    }

    fn oversized(&self, name: &str, len: usize) -> NotifError {
        NotifError::invalid(format!(
            "Parameter [{}] is {} bytes and exceeds the {} byte limit",
            name, len, self.max_payload_bytes
        ))
    }

    fn request<B>(&self, endpoint: &str, body: B) -> TriggerRequest<B> {
        TriggerRequest {
            path: format!("/apps/{}/{}", self.app_id, endpoint),
            query: self.query.clone(),
            body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{BackupDataEvent, Event};
    use serde_json::json;

    fn plain(channel: &str, event: &str, data: serde_json::Value) -> PublishRequest {
        Event::new(channel, event, data).into()
    }

    #[test]
    fn builds_single_channel_trigger() {
        let builder = TriggerBuilder::new("3");
        let req = builder
            .build(&plain("presence-lobby", "new-message", json!({ "text": "hi" })))
            .unwrap();
        assert_eq!(req.path, "/apps/3/events");
        assert_eq!(
            serde_json::to_value(&req.body).unwrap(),
            json!({
                "name": "new-message",
                "channels": ["presence-lobby"],
                "data": "{\"text\":\"hi\"}"
            })
        );
    }

    #[test]
    fn socket_id_is_carried_and_checked() {
        let builder = TriggerBuilder::new("3");
        let ok = Event::new("c", "e", json!(null)).with_socket_id("1.2");
        assert_eq!(
            builder.build(&ok.into()).unwrap().body.socket_id.as_deref(),
            Some("1.2")
        );
        let bad = Event::new("c", "e", json!(null)).with_socket_id("nope");
        assert!(builder.build(&bad.into()).is_err());
    }

    #[test]
    fn rejects_bad_channel_and_event_name() {
        let builder = TriggerBuilder::new("3");
        let err = builder.build(&plain("bad channel!", "e", json!(1))).unwrap_err();
        assert!(err.to_string().contains("channel [bad channel!]"));
        assert!(builder.build(&plain("c", "", json!(1))).is_err());
        let long = "e".repeat(MAX_EVENT_NAME_BYTES + 1);
        assert!(builder.build(&plain("c", &long, json!(1))).is_err());
    }

    #[test]
    fn oversized_data_falls_back_to_backup() {
        let builder = TriggerBuilder::new("3").max_payload_bytes(16);
        let event = Event::new("c", "e", json!({ "body": "x".repeat(64) }));
        assert!(builder.build(&event.clone().into()).is_err());

        let request: PublishRequest = BackupDataEvent::new(event, json!({ "id": 7 })).into();
        let req = builder.build(&request).unwrap();
        assert_eq!(req.body.data, r#"{"id":7}"#);
    }

    #[test]
    fn oversized_backup_is_rejected() {
        let builder = TriggerBuilder::new("3").max_payload_bytes(4);
        let request: PublishRequest = BackupDataEvent::new(
            Event::new("c", "e", json!("too long")),
            json!("also long"),
        )
        .into();
        let err = builder.build(&request).unwrap_err();
        assert!(err.to_string().contains("[backupData]"));
    }

    #[test]
    fn backup_is_unused_when_data_fits() {
        let builder = TriggerBuilder::new("3");
        let request: PublishRequest =
            BackupDataEvent::new(Event::new("c", "e", json!(1)), json!(2)).into();
        assert_eq!(builder.build(&request).unwrap().body.data, "1");
    }

    #[test]
    fn multi_channel_limits() {
        let builder = TriggerBuilder::new("3");
        let request = plain("ignored", "e", json!(1));
        let req = builder.build_multi(&["a", "b"], &request).unwrap();
        assert_eq!(req.body.channels, vec!["a", "b"]);

        let too_many: Vec<String> = (0..=MAX_TRIGGER_CHANNELS).map(|i| format!("c{}", i)).collect();
        assert!(builder.build_multi(&too_many, &request).is_err());
        assert!(builder.build_multi(&[] as &[&str], &request).is_err());
        let err = builder.build_multi(&["a", "b c", "d/e"], &request).unwrap_err();
        assert!(err.to_string().contains("[b c]"));
    }

    #[test]
    fn batch_limits() {
        let builder = TriggerBuilder::new("3");
        let events: Vec<PublishRequest> = (0..MAX_BATCH_EVENTS)
            .map(|i| plain(&format!("c{}", i), "e", json!(i)))
            .collect();
        let req = builder.build_batch(&events).unwrap();
        assert_eq!(req.path, "/apps/3/batch_events");
        assert_eq!(req.body.batch.len(), MAX_BATCH_EVENTS);
        assert_eq!(req.body.batch[3].channel, "c3");

        let mut too_many = events;
        too_many.push(plain("c", "e", json!(0)));
        assert!(builder.build_batch(&too_many).is_err());
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = TriggerBuilder::new("3").build_batch(&[]).unwrap_err();
        assert!(err.to_string().contains("[batch]"));
    }

    #[test]
    fn query_params_reject_reserved_keys() {
        let mut params = BTreeMap::new();
        params.insert("auth_signature".to_string(), "x".to_string());
        params.insert("foo".to_string(), "bar".to_string());
        let err = TriggerBuilder::new("3").with_query_params(params).err().unwrap();
        assert!(err.to_string().contains("auth_signature"));

        let mut params = BTreeMap::new();
        params.insert("foo".to_string(), "bar".to_string());
        let builder = TriggerBuilder::new("3").with_query_params(params).unwrap();
        let req = builder.build(&plain("c", "e", json!(1))).unwrap();
        assert_eq!(req.query.get("foo").map(String::as_str), Some("bar"));
    }
}
