use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Camera options, as sent with `camera.setOptions` and returned by
/// `camera.getOptions`.
///
/// Only the options the client itself relies on are typed; everything else,
/// including vendor `_`-prefixed options, round-trips through `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture_support: Option<Vec<f64>>,

    #[serde(rename = "_autoBracket", skip_serializing_if = "Option::is_none")]
    pub auto_bracket: Option<Bracket>,
    #[serde(rename = "_autoBracketSupport", skip_serializing_if = "Option::is_none")]
    pub auto_bracket_support: Option<Vec<u32>>,

    #[serde(rename = "_captureInterval", skip_serializing_if = "Option::is_none")]
    pub capture_interval: Option<u32>,
    #[serde(rename = "_captureIntervalSupport", skip_serializing_if = "Option::is_none")]
    pub capture_interval_support: Option<Vec<u32>>,

    /// Requested API level. Writing `2` moves the camera to OSC v2.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<u8>,

    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Options {
    pub fn client_version(level: u8) -> Self {
        Options {
            client_version: Some(level),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    #[serde(rename = "_bracketNumber", skip_serializing_if = "Option::is_none")]
    pub bracket_number: Option<u32>,
    // THETA firmware sends one entry per bracketed shot, not a single object.
    #[serde(rename = "_bracketParameters", skip_serializing_if = "Option::is_none")]
    pub bracket_parameters: Option<Vec<BracketParameters>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BracketParameters {
    #[serde(rename = "shutterSpeed", skip_serializing_if = "Option::is_none")]
    pub shutter_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,
    #[serde(rename = "_colorTemperature", skip_serializing_if = "Option::is_none")]
    pub color_temperature: Option<u32>,
}
