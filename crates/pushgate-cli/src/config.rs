use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Deserialize;

use pushgate_core::DeviceToken;
use pushgate_dispatch::{Gateway, HttpGateway, StaticGatewayStore};

/// Gateway configuration file (TOML).
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Whether to record notifications when neither --persist nor
    /// --no-persist was given.
    #[serde(default = "default_true")]
    pub default_persist: bool,

    /// JSON-lines file persisted notifications are appended to.
    pub history_path: Option<PathBuf>,

    #[serde(default, rename = "gateway")]
    pub gateways: Vec<GatewayConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    pub id: i64,
    pub name: String,
    /// Push-proxy endpoint batches are POSTed to.
    pub endpoint_url: String,
    #[serde(default)]
    pub devices: Vec<String>,
}

fn default_true() -> bool {
    true
}

pub fn load(path: &Path) -> Result<Config> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
}

pub fn build_store(config: &Config) -> Result<StaticGatewayStore> {
    let mut store = StaticGatewayStore::default();
    for gw in &config.gateways {
        let endpoint = gw
            .endpoint_url
            .parse()
            .with_context(|| format!("gateway {}: invalid endpoint_url", gw.id))?;
        let devices = gw.devices.iter().map(|d| DeviceToken::from(d.as_str())).collect();
        store.insert(Arc::new(HttpGateway::new(gw.id, &gw.name, endpoint, devices)) as Arc<dyn Gateway>);
    }
    Ok(store)
}
