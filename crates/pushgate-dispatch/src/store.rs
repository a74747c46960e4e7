use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use pushgate_core::PushError;

use crate::gateway::{Gateway, GatewayStore};

/// In-memory gateway store built from configuration at startup.
#[derive(Default)]
pub struct StaticGatewayStore {
    gateways: HashMap<i64, Arc<dyn Gateway>>,
}

impl StaticGatewayStore {
    pub fn new(gateways: impl IntoIterator<Item = Arc<dyn Gateway>>) -> Self {
        Self {
            gateways: gateways.into_iter().map(|g| (g.id(), g)).collect(),
        }
    }

    pub fn insert(&mut self, gateway: Arc<dyn Gateway>) {
        self.gateways.insert(gateway.id(), gateway);
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }
}

#[async_trait]
impl GatewayStore for StaticGatewayStore {
    async fn lookup(&self, id: i64) -> Result<Arc<dyn Gateway>, PushError> {
        self.gateways
            .get(&id)
            .cloned()
            .ok_or(PushError::GatewayNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use pushgate_core::DeviceToken;

    use super::*;
    use crate::adapters::http::HttpGateway;

    #[tokio::test]
    async fn lookup_misses_report_gateway_not_found() {
        let gateway = HttpGateway::new(
            7,
            "staging",
            "http://localhost:9999/push".parse().unwrap(),
            vec![DeviceToken::from("t")],
        );
        let store = StaticGatewayStore::new([Arc::new(gateway) as Arc<dyn Gateway>]);

        assert_eq!(store.lookup(7).await.unwrap().id(), 7);
        assert!(matches!(
            store.lookup(8).await,
            Err(PushError::GatewayNotFound(8))
        ));
    }
}
