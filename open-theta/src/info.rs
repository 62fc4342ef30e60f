use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `GET /osc/info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub firmware_version: Option<String>,
    pub support_url: Option<String>,
    pub gps: Option<bool>,
    pub gyro: Option<bool>,
    pub uptime: Option<u64>,
    pub api: Option<Vec<String>>,
    pub endpoints: Option<Endpoints>,
}

impl Info {
    /// API levels the camera advertises, empty if it does not say.
    pub fn api_levels(&self) -> &[u8] {
        self.endpoints
            .as_ref()
            .and_then(|e| e.api_level.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub http_port: Option<u16>,
    pub http_updates_port: Option<u16>,
    pub api_level: Option<Vec<u8>>,
}

/// Body of `GET /osc/state`. The `state` object is device specific.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    pub fingerprint: Option<String>,
    pub state: Option<Value>,
}
