//! Presence channel identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{NotifError, NotifResult};

/// A presence user id: either a string or a number.
///
/// Serialized untagged, so numeric ids go on the wire without quotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    String(String),
    Numeric(Number),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::String(id) => f.write_str(id),
            UserId::Numeric(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId::String(id.to_string())
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        UserId::String(id)
    }
}

macro_rules! numeric_user_id {
    ($($t:ty),*) => {
        $(
            impl From<$t> for UserId {
                fn from(id: $t) -> Self {
                    UserId::Numeric(Number::from(id))
                }
            }
        )*
    };
}

numeric_user_id!(i32, i64, u32, u64);

/// User info for presence channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUser {
    user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_info: Option<Value>,
}

impl PresenceUser {
    pub fn new(user_id: impl Into<UserId>, user_info: Option<Value>) -> Self {
        Self {
            user_id: user_id.into(),
            user_info,
        }
    }

    /// Build from an id that may be missing, e.g. read from an untyped source.
    pub fn from_optional(user_id: Option<UserId>, user_info: Option<Value>) -> NotifResult<Self> {
        let user_id =
            user_id.ok_or_else(|| NotifError::invalid("Parameter [userId] must not be null"))?;
        Ok(Self { user_id, user_info })
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn user_info(&self) -> Option<&Value> {
        self.user_info.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_id_without_info() {
        let user = PresenceUser::new("user-42", None);
        assert_eq!(user.user_id(), &UserId::String("user-42".to_string()));
        assert_eq!(user.user_info(), None);
    }

    #[test]
    fn missing_id_fails_at_construction() {
        let err = PresenceUser::from_optional(None, Some(json!({ "name": "x" }))).unwrap_err();
        assert!(matches!(err, NotifError::InvalidArgument(ref m) if m.contains("[userId]")));
    }

    #[test]
    fn numeric_ids_serialize_without_quotes() {
        let user = PresenceUser::new(42u64, Some(json!({ "name": "Ada" })));
        assert_eq!(
            serde_json::to_string(&user).unwrap(),
            r#"{"user_id":42,"user_info":{"name":"Ada"}}"#
        );
        let user = PresenceUser::new("42", None);
        assert_eq!(serde_json::to_string(&user).unwrap(), r#"{"user_id":"42"}"#);
    }

    #[test]
    fn ids_compare_by_variant() {
        assert_ne!(UserId::from("7"), UserId::from(7));
        assert_eq!(UserId::from(7i32), UserId::from(7u64));
        assert_eq!(UserId::from(-3).to_string(), "-3");
        assert_eq!(UserId::from("abc").to_string(), "abc");
    }

    #[test]
    fn deserializes_either_variant() {
        let user: PresenceUser = serde_json::from_str(r#"{"user_id":9}"#).unwrap();
        assert_eq!(user.user_id(), &UserId::from(9));
        let user: PresenceUser = serde_json::from_str(r#"{"user_id":"nine"}"#).unwrap();
        assert_eq!(user.user_id(), &UserId::from("nine"));
    }
}
