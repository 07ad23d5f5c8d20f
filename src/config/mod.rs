//! Client configuration loaded from environment.

use validator::Validate;

use crate::error::{NotifError, NotifResult};
use crate::services::trigger::DEFAULT_MAX_PAYLOAD_BYTES;
use crate::validation;

/// Client configuration loaded from `.env` and environment variables.
#[derive(Debug, Clone, Validate)]
pub struct Config {
    /// Application id used in request paths (`/apps/{app_id}/events`).
    #[validate(length(min = 1))]
    pub app_id: String,
    /// Application key, sent as `auth_key` and as the prefix of channel auth values.
    #[validate(length(min = 1))]
    pub app_key: String,
    /// Secret for HMAC-SHA256 signing. Checked when the config is loaded.
    pub app_secret: String,
    /// API host (e.g. `api.pusherapp.com`).
    #[validate(length(min = 1, max = 255))]
    pub host: String,
    /// Largest marshalled event payload, in bytes.
    #[validate(range(min = 1))]
    pub max_payload_bytes: usize,
    /// Log level: `error`, `warn`, `info`, `debug`, `trace`.
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment. Call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> NotifResult<Self> {
        let var = |name: &str| std::env::var(name).ok();

        let app_id = var("NOTIF_APP_ID").unwrap_or_default();
        let app_key = var("NOTIF_APP_KEY").unwrap_or_default();
        let app_secret = var("NOTIF_APP_SECRET").unwrap_or_default();
        let host = var("NOTIF_HOST").unwrap_or_else(|| "api.pusherapp.com".to_string());
        let max_payload_bytes = match var("NOTIF_MAX_PAYLOAD_BYTES") {
            Some(raw) => raw.parse().map_err(|_| {
                NotifError::Config(format!("Invalid NOTIF_MAX_PAYLOAD_BYTES: {}", raw))
            })?,
            None => DEFAULT_MAX_PAYLOAD_BYTES,
        };
        let log_level = var("LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Self::new(app_id, app_key, app_secret, host, max_payload_bytes, log_level)
    }

    /// Build and check a configuration. An unusable secret is reported here rather than at
    /// first publish.
    pub fn new(
        app_id: String,
        app_key: String,
        app_secret: String,
        host: String,
        max_payload_bytes: usize,
        log_level: String,
    ) -> NotifResult<Self> {
        let config = Self {
            app_id,
            app_key,
            app_secret,
            host,
            max_payload_bytes,
            log_level,
        };
        config
            .validate()
            .map_err(|e| NotifError::Config(e.to_string()))?;
        validation::require_valid_signing_key("app_secret", &config.app_secret)?;
        Ok(config)
    }
}
