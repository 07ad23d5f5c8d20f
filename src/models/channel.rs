//! Channel kinds and their naming conventions.

use serde::{Deserialize, Serialize};

/// Channel type based on prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    /// No auth required to subscribe.
    Public,
    /// Subscription needs a signed `socket_id:channel`.
    Private,
    /// Private, plus the subscriber's `channel_data` is part of the signature.
    Presence,
}

impl ChannelType {
    /// Derive channel type from name. Pusher-style: `private-*`, `presence-*`.
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("presence-") {
            ChannelType::Presence
        } else if name.starts_with("private-") {
            ChannelType::Private
        } else {
            ChannelType::Public
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, ChannelType::Private | ChannelType::Presence)
    }

    pub fn carries_channel_data(&self) -> bool {
        *self == ChannelType::Presence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_names() {
        assert_eq!(ChannelType::from_name("my-channel"), ChannelType::Public);
        assert_eq!(ChannelType::from_name("privateer"), ChannelType::Public);
        assert!(!ChannelType::Public.requires_auth());
    }

    #[test]
    fn private_names() {
        let kind = ChannelType::from_name("private-user-1");
        assert_eq!(kind, ChannelType::Private);
        assert!(kind.requires_auth());
        assert!(!kind.carries_channel_data());
    }

    #[test]
    fn presence_names() {
        let kind = ChannelType::from_name("presence-lobby");
        assert_eq!(kind, ChannelType::Presence);
        assert!(kind.requires_auth());
        assert!(kind.carries_channel_data());
    }
}
