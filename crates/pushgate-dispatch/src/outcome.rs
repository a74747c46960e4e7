use serde::{Deserialize, Serialize};

use pushgate_core::DeviceToken;

/// Delivery status of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Every device in the batch was accepted by the gateway.
    Delivered,
    /// The gateway accepted the batch but rejected some devices.
    PartiallyFailed,
    /// The batch could not be delivered at all.
    Failed,
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BatchStatus::Delivered => "delivered",
            BatchStatus::PartiallyFailed => "partially failed",
            BatchStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One per-device or transport-level error descriptor.
///
/// `token` is `None` for transport failures that affect the whole
/// batch rather than a specific device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryError {
    pub token: Option<DeviceToken>,
    pub reason: String,
}

impl DeliveryError {
    pub fn device(token: DeviceToken, reason: impl Into<String>) -> Self {
        Self {
            token: Some(token),
            reason: reason.into(),
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        Self {
            token: None,
            reason: reason.into(),
        }
    }
}

/// Result of submitting one batch to the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub batch_index: usize,
    pub device_count: usize,
    pub status: BatchStatus,
    pub errors: Vec<DeliveryError>,
}

impl DispatchOutcome {
    /// Devices in this batch the gateway actually accepted.
    pub fn devices_delivered(&self) -> usize {
        match self.status {
            BatchStatus::Delivered => self.device_count,
            BatchStatus::PartiallyFailed => self.device_count.saturating_sub(self.errors.len()),
            BatchStatus::Failed => 0,
        }
    }
}

/// Aggregate result of one dispatch call.
///
/// Outcomes are ordered by batch index. The caller decides from this
/// report whether the overall request counts as failed and whether to
/// persist the notification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchReport {
    pub outcomes: Vec<DispatchOutcome>,
    pub devices_attempted: usize,
    pub devices_delivered: usize,
    pub cancelled: bool,
}

impl DispatchReport {
    pub fn from_outcomes(outcomes: Vec<DispatchOutcome>, cancelled: bool) -> Self {
        let devices_attempted = outcomes.iter().map(|o| o.device_count).sum();
        let devices_delivered = outcomes.iter().map(|o| o.devices_delivered()).sum();
        Self {
            outcomes,
            devices_attempted,
            devices_delivered,
            cancelled,
        }
    }

    pub fn batches_failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == BatchStatus::Failed)
            .count()
    }

    pub fn any_delivered(&self) -> bool {
        self.devices_delivered > 0
    }

    /// True when batches were attempted and every one of them failed.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.batches_failed() == self.outcomes.len()
    }
}
