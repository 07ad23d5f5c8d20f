//! Precondition checks run before a publish or channel-auth request is built and signed.
//!
//! Every check is a pure function returning `Err(NotifError::InvalidArgument)` on bad
//! input. Messages carry the parameter name and, where there is one, the offending value.

use std::collections::HashSet;
use std::sync::LazyLock;

use hmac::{Hmac, Mac};
use regex::Regex;
use sha2::Sha256;
use tracing::debug;

use crate::error::{NotifError, NotifResult};

type HmacSha256 = Hmac<Sha256>;

/// Channel names: Pusher's own naming rule.
static VALID_CHANNEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_=@,.;]+$").expect("invalid channel pattern"));

/// Socket ids: `<digits>.<digits>`, ASCII only.
static VALID_SOCKET_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+$").expect("invalid socket id pattern"));

/// Query keys generated by the request signature.
pub const RESERVED_QUERY_KEYS: [&str; 5] = [
    "auth_key",
    "auth_timestamp",
    "auth_version",
    "auth_signature",
    "body_md5",
];

static RESERVED_KEY_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| RESERVED_QUERY_KEYS.into_iter().collect());

fn reject(msg: String) -> NotifError {
    debug!(reason = %msg, "precondition failed");
    NotifError::InvalidArgument(msg)
}

/// Unwrap a required value.
pub fn require_non_null<T>(name: &str, value: Option<T>) -> NotifResult<T> {
    value.ok_or_else(|| reject(format!("Parameter [{}] must not be null", name)))
}

/// Require a present, non-empty string.
pub fn require_non_empty<'a>(name: &str, value: Option<&'a str>) -> NotifResult<&'a str> {
    let value = require_non_null(name, value)?;
    if value.is_empty() {
        return Err(reject(format!("Parameter [{}] must not be empty", name)));
    }
    Ok(value)
}

pub fn require_max_length<T>(name: &str, max: usize, list: &[T]) -> NotifResult<()> {
    if list.len() > max {
        return Err(reject(format!(
            "Parameter [{}] must have at most {} elements, got {}",
            name,
            max,
            list.len()
        )));
    }
    Ok(())
}

pub fn require_no_null_members<T>(name: &str, list: &[Option<T>]) -> NotifResult<()> {
    if list.iter().any(Option::is_none) {
        return Err(reject(format!(
            "Parameter [{}] must not contain null elements",
            name
        )));
    }
    Ok(())
}

/// Reject caller-supplied query parameters that collide with the signature's own keys.
/// Matching is case-insensitive; the error names the key as it was supplied.
pub fn require_no_reserved_keys<I, K, V>(params: I) -> NotifResult<()>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
{
    for (key, _) in params {
        let key = key.as_ref();
        if RESERVED_KEY_SET.contains(key.to_ascii_lowercase().as_str()) {
            return Err(reject(format!(
                "Query parameter key [{}] is reserved and should not be submitted. \
                 It will be generated by the signature generation.",
                key
            )));
        }
    }
    Ok(())
}

/// Check that `key` can key an HMAC-SHA256 instance.
///
/// An empty secret is rejected as a bad key. `UnrecoverableConfig` is reserved for a
/// runtime that cannot provide the algorithm at all; with the `hmac` crate linked
/// statically the key check is the only failure path.
pub fn require_valid_signing_key(name: &str, key: &str) -> NotifResult<()> {
    if key.is_empty() {
        return Err(reject(format!(
            "Parameter [{}] must be a valid SHA256 key: key is empty",
            name
        )));
    }
    HmacSha256::new_from_slice(key.as_bytes())
        .map(|_| ())
        .map_err(|e| reject(format!("Parameter [{}] must be a valid SHA256 key: {}", name, e)))
}

pub fn require_valid_channel(channel: &str) -> NotifResult<()> {
    matches_pattern("channel", &VALID_CHANNEL, channel)
}

/// Fails on the first invalid channel.
pub fn require_valid_channels<S: AsRef<str>>(channels: &[S]) -> NotifResult<()> {
    channels
        .iter()
        .try_for_each(|channel| require_valid_channel(channel.as_ref()))
}

/// An absent socket id is valid.
pub fn require_valid_socket_id(socket_id: Option<&str>) -> NotifResult<()> {
    match socket_id {
        Some(id) => matches_pattern("socket_id", &VALID_SOCKET_ID, id),
        None => Ok(()),
    }
}

fn matches_pattern(name: &str, pattern: &Regex, value: &str) -> NotifResult<()> {
    if !pattern.is_match(value) {
        return Err(reject(format!("{} [{}] is not valid", name, value)));
    }
    Ok(())
}
