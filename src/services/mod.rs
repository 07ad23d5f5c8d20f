//! Request building and channel authentication on top of the validation checks.

pub mod auth;
pub mod trigger;

pub use auth::{AuthResponse, ChannelAuthenticator};
pub use trigger::{BatchBody, BatchEvent, TriggerBody, TriggerBuilder, TriggerRequest};
