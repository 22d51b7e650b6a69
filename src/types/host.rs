use serde::{Deserialize, Serialize};

/// Channel kinds the core distinguishes between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelKind {
    GuildText,
    GuildVoice,
    GuildCategory,
    Thread,
    DirectMessage,
    GroupDm,
    Other,
}

/// A channel as reported by the host's channel store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub id: String,
    pub guild_id: Option<String>,
    pub parent_id: Option<String>,
    pub name: Option<String>,
    pub kind: ChannelKind,
    /// Other participants of a DM or group DM.
    pub recipients: Vec<UserInfo>,
    /// Group DM icon hash.
    pub icon: Option<String>,
}

impl ChannelInfo {
    pub fn is_dm(&self) -> bool {
        self.kind == ChannelKind::DirectMessage
    }

    pub fn is_group_dm(&self) -> bool {
        self.kind == ChannelKind::GroupDm
    }

    pub fn is_private(&self) -> bool {
        self.is_dm() || self.is_group_dm()
    }

    /// The counterpart of a one-to-one DM.
    pub fn recipient_id(&self) -> Option<&str> {
        if self.is_dm() {
            self.recipients.first().map(|u| u.id.as_str())
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuildInfo {
    pub id: String,
    pub name: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub bot: bool,
    pub avatar_url: Option<String>,
}

/// Presence of a DM counterpart. `None` is used for guild channels and group DMs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    Online,
    Idle,
    Dnd,
    Offline,
    #[default]
    None,
}
