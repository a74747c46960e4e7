use std::sync::Arc;

use async_trait::async_trait;

use pushgate_core::{DeviceToken, Notification, PushError};

use crate::outcome::DeliveryError;

/// What the gateway reported back for one accepted batch.
#[derive(Debug, Default)]
pub struct DeliveryReceipt {
    /// Devices the gateway rejected (stale/invalid tokens and the like).
    pub rejected: Vec<DeliveryError>,
}

/// An upstream push service and its registered device set.
///
/// The dispatcher treats the wire protocol as opaque: it only needs
/// read access to the device list and a way to hand a serialized
/// payload to a group of devices.
#[async_trait]
pub trait Gateway: Send + Sync {
    fn id(&self) -> i64;

    fn name(&self) -> &str;

    /// Ordered list of registered recipient devices. Read-only for the
    /// duration of a dispatch call.
    async fn list_devices(&self) -> Result<Vec<DeviceToken>, PushError>;

    /// Deliver one serialized payload to a group of devices.
    ///
    /// `Err(PushError::Transport)` means the whole batch failed; an
    /// `Ok` receipt may still carry per-device rejections.
    async fn deliver(
        &self,
        payload: &[u8],
        devices: &[DeviceToken],
    ) -> Result<DeliveryReceipt, PushError>;
}

/// Lookup of configured gateways by identifier.
///
/// An explicit dependency rather than ambient global state, so the
/// dispatch core stays testable without a live configuration store.
#[async_trait]
pub trait GatewayStore: Send + Sync {
    async fn lookup(&self, id: i64) -> Result<Arc<dyn Gateway>, PushError>;
}

/// Sink for notifications the caller decides to keep after dispatch.
///
/// Invoked by the caller, never by the dispatcher itself.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn persist(&self, notification: &Notification) -> Result<(), PushError>;
}
