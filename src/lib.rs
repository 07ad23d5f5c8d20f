//! Client-side contract layer for publishing to a Pusher-compatible HTTP API.
//!
//! Validates channel names, socket ids, query parameters and signing keys before a
//! request is built, and provides the immutable event and presence-user models the
//! request is built from. Transport and request signing live outside this crate.

pub mod config;
pub mod error;
pub mod marshaller;
pub mod models;
pub mod services;
pub mod validation;

pub use config::Config;
pub use error::{NotifError, NotifResult};
pub use marshaller::{DataMarshaller, DefaultDataMarshaller};
pub use models::{BackupDataEvent, ChannelType, Event, PresenceUser, PublishRequest, UserId};
pub use services::{AuthResponse, ChannelAuthenticator, TriggerBuilder};
