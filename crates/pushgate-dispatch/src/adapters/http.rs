use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use pushgate_core::{DeviceToken, PushError};

use crate::gateway::{DeliveryReceipt, Gateway};
use crate::outcome::DeliveryError;

/// Gateway backed by an internal push-proxy HTTP endpoint.
///
/// Each batch becomes one POST carrying the wire payload and the
/// device tokens; the proxy owns the actual APNs connection and
/// certificate handling. Per-device rejections come back in the
/// response body.
pub struct HttpGateway {
    id: i64,
    name: String,
    endpoint: Url,
    devices: Vec<DeviceToken>,
    http_client: Client,
}

impl HttpGateway {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        endpoint: Url,
        devices: Vec<DeviceToken>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            endpoint,
            devices,
            http_client: Client::new(),
        }
    }
}

/// Push-proxy response body for an accepted batch.
#[derive(Debug, Deserialize)]
struct DeliverResponse {
    #[serde(default)]
    rejected: Vec<RejectedDevice>,
}

#[derive(Debug, Deserialize)]
struct RejectedDevice {
    token: String,
    reason: Option<String>,
}

#[async_trait]
impl Gateway for HttpGateway {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn list_devices(&self) -> Result<Vec<DeviceToken>, PushError> {
        Ok(self.devices.clone())
    }

    async fn deliver(
        &self,
        payload: &[u8],
        devices: &[DeviceToken],
    ) -> Result<DeliveryReceipt, PushError> {
        let wire: serde_json::Value = serde_json::from_slice(payload)
            .map_err(|e| PushError::Internal(format!("payload is not valid JSON: {e}")))?;

        let body = json!({
            "gateway": self.id,
            "device_tokens": devices,
            "payload": wire,
        });

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(PushError::Transport(format!(
                "push endpoint returned {status}: {detail}"
            )));
        }

        // An empty success body means no rejections; a body that fails
        // to parse is an unusable receipt, not a clean delivery.
        let body = response
            .bytes()
            .await
            .map_err(|e| PushError::Transport(e.to_string()))?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(DeliveryReceipt::default());
        }
        let parsed: DeliverResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!(gateway = self.id, error = %e, "push endpoint returned an unreadable delivery receipt");
            PushError::Transport(format!("unreadable delivery receipt: {e}"))
        })?;
        let rejected = parsed
            .rejected
            .into_iter()
            .map(|r| {
                DeliveryError::device(
                    DeviceToken(r.token),
                    r.reason.unwrap_or_else(|| "rejected by gateway".to_string()),
                )
            })
            .collect();
        Ok(DeliveryReceipt { rejected })
    }
}
