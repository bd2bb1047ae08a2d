use serde::Deserialize;

pub const DEFAULT_CONTENT_RENDERER_KEY: &str = "jsxRenderer";
pub const DEFAULT_MIN_PARENT_SIZE: f64 = 10.0;
pub const DEFAULT_MARKER_ICON_URL: &str = "marker-icon.png";
pub const DEFAULT_MARKER_SHADOW_URL: &str = "marker-shadow.png";

/// Settings for one bridge root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// Registry key the content-rendering service is stored under.
    pub content_renderer_key: String,
    /// Parents smaller than this (px, either side) trigger a warning.
    pub min_parent_size: f64,
    pub marker_icon_url: String,
    pub marker_shadow_url: String,
}

impl BridgeConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            content_renderer_key: DEFAULT_CONTENT_RENDERER_KEY.to_string(),
            min_parent_size: DEFAULT_MIN_PARENT_SIZE,
            marker_icon_url: DEFAULT_MARKER_ICON_URL.to_string(),
            marker_shadow_url: DEFAULT_MARKER_SHADOW_URL.to_string(),
        }
    }
}
