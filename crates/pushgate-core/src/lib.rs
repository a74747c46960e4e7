pub mod error;
pub mod payload;
pub mod types;

pub use error::PushError;
pub use payload::{
    DEFAULT_MAX_PAYLOAD_BYTES, Notification, NotificationFields, parse_badge, parse_extra,
};
pub use types::{DeviceToken, ExtraFields, Persistence};
