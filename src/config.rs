use serde::Deserialize;
use tracing::warn;

use crate::gesture::PinchPanConfig;

/// Id of the `<script type="application/json">` element the host page uses
/// to pass configuration in.
pub const CONFIG_ELEMENT_ID: &str = "app-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub zoom: PinchPanConfig,
    pub zoom_step: f64,
    /// Width / height of the player surface.
    pub aspect_ratio: f64,
    /// Principal of the signed-in caller, as handed over by the identity
    /// provider. `None` when anonymous.
    pub principal: Option<String>,
    pub video: Option<VideoSource>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoSource {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub blocked: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            zoom: PinchPanConfig::default(),
            zoom_step: 0.3,
            aspect_ratio: 16.0 / 9.0,
            principal: None,
            video: None,
        }
    }
}

impl AppConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Reads the config element from the current document. Missing or
    /// malformed config is logged and replaced by defaults.
    pub fn load() -> Self {
        let raw = web_sys::window()
            .and_then(|win| win.document())
            .and_then(|doc| doc.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());
        let Some(raw) = raw else {
            return Self::default();
        };
        Self::from_json(&raw).unwrap_or_else(|err| {
            warn!(%err, "Invalid app config, using defaults");
            Self::default()
        })
    }
}
