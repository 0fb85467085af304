use serde::{Deserialize, Serialize};

/// How a tab's page is rendered: by the embedded engine, or delegated
/// to an external headless capture driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    #[default]
    Native,
    ExternalDriver,
}

/// Represents a browser tab. Owned exclusively by the tab registry;
/// the UI shell only ever sees copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "renderMode", default)]
    pub render_mode: RenderMode,
}
