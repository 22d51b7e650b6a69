use serde::{Deserialize, Serialize};

/// An open navigational slot in the tab bar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub icon_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub minimized: bool,
}

impl Tab {
    /// The Friends page tab used for "new tab" and as the startup default.
    pub fn friends() -> Self {
        Self {
            url: FRIENDS_URL.to_string(),
            name: "Friends".to_string(),
            icon_url: String::new(),
            channel_id: None,
            selected: false,
            minimized: false,
        }
    }
}

pub const FRIENDS_URL: &str = "/channels/@me";

/// Builds the canonical url of a channel, using `@me` for private channels.
pub fn channel_url(guild_id: Option<&str>, channel_id: &str) -> String {
    format!("/channels/{}/{}", guild_id.unwrap_or("@me"), channel_id)
}
