use serde::{Deserialize, Serialize};

/// `groupId` of a favourite shown directly on the bar.
pub const UNGROUPED: i32 = -1;

/// A persisted bookmark to a channel, guild, or DM.
///
/// `guild_id` is only set when the bookmark means "this guild, whatever
/// channel is selected in it"; `channel_id` is then absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Favourite {
    pub name: String,
    #[serde(default)]
    pub icon_url: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default = "ungrouped")]
    pub group_id: i32,
    #[serde(default)]
    pub minimized: bool,
}

fn ungrouped() -> i32 {
    UNGROUPED
}

impl Favourite {
    pub fn is_grouped(&self) -> bool {
        self.group_id != UNGROUPED
    }
}

/// A named folder of favourites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FavouriteGroup {
    pub name: String,
    pub group_id: i32,
}
