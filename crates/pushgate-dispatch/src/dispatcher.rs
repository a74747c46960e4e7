use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use pushgate_core::{DeviceToken, Notification, PushError};

use crate::gateway::Gateway;
use crate::outcome::{BatchStatus, DeliveryError, DispatchOutcome, DispatchReport};

/// Cooperative cancellation flag for an in-progress dispatch.
///
/// Once cancelled, no new batch is started; batches already in flight
/// run to completion and their outcomes are still reported.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Delivers one validated notification to a gateway's device set in
/// fixed-size batches.
///
/// Batches run through a bounded worker pool (`concurrency` at a time);
/// recorded outcomes are always ordered by batch index regardless of
/// the order in which network calls complete. There is no retry here:
/// retry policy, if any, belongs to a layer above.
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    concurrency: usize,
}

impl Default for BatchDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchDispatcher {
    /// Sequential dispatcher, matching the upstream gateway's most
    /// conservative expectations.
    pub fn new() -> Self {
        Self { concurrency: 1 }
    }

    pub fn with_concurrency(concurrency: usize) -> Result<Self, PushError> {
        if concurrency == 0 {
            return Err(PushError::invalid("concurrency must be a positive integer"));
        }
        Ok(Self { concurrency })
    }

    pub async fn dispatch(
        &self,
        notification: &Notification,
        gateway: &dyn Gateway,
        batch_size: usize,
    ) -> Result<DispatchReport, PushError> {
        self.dispatch_with_cancel(notification, gateway, batch_size, &CancelToken::new())
            .await
    }

    pub async fn dispatch_with_cancel(
        &self,
        notification: &Notification,
        gateway: &dyn Gateway,
        batch_size: usize,
        cancel: &CancelToken,
    ) -> Result<DispatchReport, PushError> {
        if batch_size == 0 {
            return Err(PushError::invalid(
                "batch size must be a positive integer",
            ));
        }

        // Serialized exactly once; every batch sends the same bytes.
        let payload = notification.serialize()?;
        let payload = payload.as_slice();

        let devices = gateway.list_devices().await?;
        if devices.is_empty() {
            debug!(gateway = gateway.id(), "no registered devices, nothing to dispatch");
            return Ok(DispatchReport::default());
        }

        let batch_count = devices.len().div_ceil(batch_size);
        info!(
            gateway = gateway.id(),
            devices = devices.len(),
            batch_size,
            batches = batch_count,
            "dispatching notification"
        );

        // `buffered` polls up to `concurrency` batch futures at once but
        // yields results in input order, which keeps outcomes aligned
        // with their batch index.
        let outcomes: Vec<Option<DispatchOutcome>> =
            stream::iter(devices.chunks(batch_size).enumerate())
                .map(|(batch_index, batch)| async move {
                    if cancel.is_cancelled() {
                        debug!(batch = batch_index, "skipping batch, dispatch cancelled");
                        return None;
                    }
                    Some(send_batch(gateway, payload, batch_index, batch).await)
                })
                .buffered(self.concurrency)
                .collect()
                .await;

        let outcomes: Vec<DispatchOutcome> = outcomes.into_iter().flatten().collect();
        let report = DispatchReport::from_outcomes(outcomes, cancel.is_cancelled());
        info!(
            gateway = gateway.id(),
            attempted = report.devices_attempted,
            delivered = report.devices_delivered,
            failed_batches = report.batches_failed(),
            cancelled = report.cancelled,
            "dispatch completed"
        );
        Ok(report)
    }
}

async fn send_batch(
    gateway: &dyn Gateway,
    payload: &[u8],
    batch_index: usize,
    devices: &[DeviceToken],
) -> DispatchOutcome {
    match gateway.deliver(payload, devices).await {
        Ok(receipt) if receipt.rejected.is_empty() => DispatchOutcome {
            batch_index,
            device_count: devices.len(),
            status: BatchStatus::Delivered,
            errors: Vec::new(),
        },
        Ok(receipt) => {
            warn!(
                batch = batch_index,
                rejected = receipt.rejected.len(),
                "gateway rejected devices in batch"
            );
            DispatchOutcome {
                batch_index,
                device_count: devices.len(),
                status: BatchStatus::PartiallyFailed,
                errors: receipt.rejected,
            }
        }
        // One failed batch never aborts the rest.
        Err(e) => {
            warn!(batch = batch_index, error = %e, "batch delivery failed");
            DispatchOutcome {
                batch_index,
                device_count: devices.len(),
                status: BatchStatus::Failed,
                errors: vec![DeliveryError::transport(e.to_string())],
            }
        }
    }
}
