//! Authentication for private and presence channels (Pusher-compatible HMAC).

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info, instrument};

use crate::error::{NotifError, NotifResult};
use crate::marshaller::{DataMarshaller, DefaultDataMarshaller};
use crate::models::channel::ChannelType;
use crate::models::presence::PresenceUser;
use crate::validation;

type HmacSha256 = Hmac<Sha256>;

/// Body returned to a client asking to subscribe to a private or presence channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// `<app_key>:<hex signature>`
    pub auth: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_data: Option<String>,
}

/// Signs channel subscriptions.
/// Pusher-style: HMAC-SHA256(app_secret, socket_id:channel_name[:channel_data]).
#[derive(Clone)]
pub struct ChannelAuthenticator {
    app_key: String,
    app_secret: String,
}

impl std::fmt::Debug for ChannelAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelAuthenticator")
            .field("app_key", &self.app_key)
            .finish_non_exhaustive()
    }
}

impl ChannelAuthenticator {
    /// Fails if the key is empty or the secret cannot key HMAC-SHA256.
    pub fn new(app_key: impl Into<String>, app_secret: impl Into<String>) -> NotifResult<Self> {
        let app_key = app_key.into();
        let app_secret = app_secret.into();
        validation::require_non_empty("key", Some(app_key.as_str()))?;
        validation::require_valid_signing_key("secret", &app_secret)?;
        Ok(Self {
            app_key,
            app_secret,
        })
    }

    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Authorize `socket_id` to subscribe to a private channel.
    #[instrument(skip(self))]
    pub fn authenticate(&self, socket_id: &str, channel: &str) -> NotifResult<AuthResponse> {
        check_subscription(socket_id, channel)?;
        let kind = ChannelType::from_name(channel);
        if !kind.requires_auth() {
            return Err(NotifError::invalid(format!(
                "channel [{}] is public and needs no authentication",
                channel
            )));
        }
        if kind.carries_channel_data() {
            return Err(NotifError::invalid(format!(
                "channel [{}] is a presence channel; authenticate it with a presence user",
                channel
            )));
        }

        let signature = self.sign(&format!("{}:{}", socket_id, channel))?;
        info!(channel = %channel, "private channel authenticated");
        Ok(AuthResponse {
            auth: format!("{}:{}", self.app_key, signature),
            channel_data: None,
        })
    }

    /// Authorize `socket_id` to join a presence channel as `user`.
    #[instrument(skip(self, user), fields(user_id = %user.user_id()))]
    pub fn authenticate_presence(
        &self,
        socket_id: &str,
        channel: &str,
        user: &PresenceUser,
    ) -> NotifResult<AuthResponse> {
        check_subscription(socket_id, channel)?;
        if !ChannelType::from_name(channel).carries_channel_data() {
            return Err(NotifError::invalid(format!(
                "channel [{}] is not a presence channel",
                channel
            )));
        }

        let channel_data = DefaultDataMarshaller.marshal(&serde_json::to_value(user)?)?;
        let signature = self.sign(&format!("{}:{}:{}", socket_id, channel, channel_data))?;
        info!(channel = %channel, "presence channel authenticated");
        Ok(AuthResponse {
            auth: format!("{}:{}", self.app_key, signature),
            channel_data: Some(channel_data),
        })
    }

    /// Check an `auth` value a client presented. Comparison is constant time.
    ///
    /// Presence channels must come with `channel_data`; other channels must not.
    pub fn verify(
        &self,
        socket_id: &str,
        channel: &str,
        auth: &str,
        channel_data: Option<&str>,
    ) -> NotifResult<bool> {
        let Some((key, signature)) = auth.split_once(':') else {
            debug!(channel = %channel, "auth value has no key prefix");
            return Ok(false);
        };
        if key != self.app_key {
            debug!(channel = %channel, "auth key mismatch");
            return Ok(false);
        }
        let Ok(signature) = hex::decode(signature) else {
            return Ok(false);
        };

        let presence = ChannelType::from_name(channel).carries_channel_data();
        let payload = match (presence, channel_data) {
            (true, Some(data)) => format!("{}:{}:{}", socket_id, channel, data),
            (false, None) => format!("{}:{}", socket_id, channel),
            (true, None) => {
                debug!(channel = %channel, "presence auth without channel_data");
                return Ok(false);
            }
            (false, Some(_)) => {
                debug!(channel = %channel, "channel_data on a non-presence channel");
                return Ok(false);
            }
        };
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        let ok = mac.verify_slice(&signature).is_ok();
        if !ok {
            debug!(channel = %channel, "auth signature mismatch");
        }
        Ok(ok)
    }

    fn sign(&self, payload: &str) -> NotifResult<String> {
        let mut mac = self.mac()?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn mac(&self) -> NotifResult<HmacSha256> {
        HmacSha256::new_from_slice(self.app_secret.as_bytes())
            .map_err(|e| {
                NotifError::invalid(format!(
                    "Parameter [secret] must be a valid SHA256 key: {}",
                    e
                ))
            })
    }
}

fn check_subscription(socket_id: &str, channel: &str) -> NotifResult<()> {
    validation::require_non_empty("socket_id", Some(socket_id))?;
    validation::require_valid_socket_id(Some(socket_id))?;
    validation::require_valid_channel(channel)
}
