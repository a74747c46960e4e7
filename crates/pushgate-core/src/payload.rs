use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::PushError;
use crate::types::{ExtraFields, Persistence};

/// Default maximum serialized payload size in bytes.
///
/// Historical APNs binary-protocol limit. Gateway protocols evolve, so
/// this is only a default for callers that do not configure their own
/// limit; every length check takes the limit as a parameter.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 256;

/// Parse a raw badge value from loosely-typed caller input.
pub fn parse_badge(raw: Option<&str>) -> Result<Option<u32>, PushError> {
    match raw {
        None => Ok(None),
        Some(s) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| PushError::invalid("badge must be an integer")),
    }
}

/// Parse raw extra-payload JSON text into typed fields.
///
/// The top-level value must be a JSON object; anything else is rejected
/// at the boundary so unstructured text is never passed around
/// internally.
pub fn parse_extra(raw: Option<&str>) -> Result<ExtraFields, PushError> {
    match raw {
        None => Ok(ExtraFields::new()),
        Some(s) => serde_json::from_str::<ExtraFields>(s)
            .map_err(|_| PushError::invalid("extra must be a JSON object")),
    }
}

/// Raw caller input for one notification, prior to validation.
#[derive(Debug, Clone, Default)]
pub struct NotificationFields {
    pub message: String,
    pub badge: Option<u32>,
    pub sound: String,
    pub extra: ExtraFields,
    pub persist: Persistence,
}

impl NotificationFields {
    /// Validate and construct the immutable [`Notification`].
    pub fn build(self) -> Result<Notification, PushError> {
        if self.message.is_empty() && self.extra.is_empty() {
            return Err(PushError::invalid("message or extra required"));
        }
        if self.extra.contains_key("aps") {
            return Err(PushError::invalid(
                "extra must not contain the reserved \"aps\" key",
            ));
        }
        Ok(Notification {
            message: self.message,
            badge: self.badge,
            sound: self.sound,
            extra: self.extra,
            persist: self.persist,
            created_at: OffsetDateTime::now_utc(),
        })
    }
}

/// A validated push notification, immutable once constructed.
///
/// Constructed only via [`NotificationFields::build`]; the wire payload
/// is derived on demand by [`Notification::serialize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub message: String,
    pub badge: Option<u32>,
    pub sound: String,
    pub extra: ExtraFields,
    pub persist: Persistence,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Reserved `aps` namespace of the wire payload.
#[derive(Serialize)]
struct Aps<'a> {
    #[serde(skip_serializing_if = "str_is_empty")]
    alert: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    badge: Option<u32>,
    #[serde(skip_serializing_if = "str_is_empty")]
    sound: &'a str,
}

/// Canonical wire shape: `aps` first, extra keys in insertion order.
#[derive(Serialize)]
struct WirePayload<'a> {
    aps: Aps<'a>,
    #[serde(flatten)]
    extra: &'a ExtraFields,
}

fn str_is_empty(s: &str) -> bool {
    s.is_empty()
}

impl Notification {
    /// Serialize the canonical wire payload.
    ///
    /// Output is byte-identical across calls on the same notification:
    /// the `aps` object comes first, extra keys follow in their
    /// original insertion order.
    pub fn serialize(&self) -> Result<Vec<u8>, PushError> {
        let wire = WirePayload {
            aps: Aps {
                alert: &self.message,
                badge: self.badge,
                sound: &self.sound,
            },
            extra: &self.extra,
        };
        serde_json::to_vec(&wire).map_err(|e| PushError::Internal(e.to_string()))
    }

    /// Check the fully serialized payload against a byte limit.
    ///
    /// The check runs on the serialized form, not individual field
    /// lengths: JSON structural overhead and multi-byte characters both
    /// count against the limit.
    pub fn is_valid_length(&self, max_bytes: usize) -> Result<bool, PushError> {
        Ok(self.serialize()?.len() <= max_bytes)
    }

    /// Like [`is_valid_length`](Self::is_valid_length) but fails with a
    /// precise error naming the actual and allowed sizes.
    pub fn validate_length(&self, max_bytes: usize) -> Result<(), PushError> {
        let actual = self.serialize()?.len();
        if actual > max_bytes {
            return Err(PushError::invalid(format!(
                "payload is {actual} bytes, exceeds the maximum of {max_bytes}"
            )));
        }
        Ok(())
    }
}
