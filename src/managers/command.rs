//! User-facing commands.
//!
//! Clicks, nav buttons, hotkeys, drag drops and menu items all turn into a
//! [`Command`]; the application dispatches it against the registry.

use crate::managers::registry::CloseMode;
use crate::types::settings::{BadgeKind, BadgeScope};

/// A channel or guild offered by one of the host's own context menus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTarget {
    pub guild_id: Option<String>,
    pub channel_id: Option<String>,
    pub name: String,
    pub icon_url: String,
}

impl HostTarget {
    /// `/channels/<guild or @me>/<channel>`, or `/channels/<guild>` for a guild.
    pub fn url(&self) -> String {
        let scope = self.guild_id.as_deref().unwrap_or("@me");
        match &self.channel_id {
            Some(channel_id) => format!("/channels/{}/{}", scope, channel_id),
            None => format!("/channels/{}", scope),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // tabs
    SwitchToTab(usize),
    CloseTab(usize, CloseMode),
    CloseCurrentTab,
    NextTab,
    PreviousTab,
    OpenNewTab,
    DuplicateTab(usize),
    MinimizeTab(usize),
    MoveTab { from: usize, to: usize },
    MoveTabLeft(usize),
    MoveTabRight(usize),
    AddTabToFavourites(usize),

    // favourites
    VisitFavourite(usize),
    OpenFavInNewTab(usize),
    RenameFavourite(usize),
    DeleteFavourite(usize),
    MinimizeFavourite(usize),
    MoveFavourite { from: usize, to: usize },
    MoveFavouriteLeft(usize),
    MoveFavouriteRight(usize),
    MoveToGroup { index: usize, group_id: i32 },
    AddCurrentToFavourites,

    // groups
    AddFavouriteGroup,
    RenameFavouriteGroup(i32),
    RemoveFavouriteGroup(i32),
    MoveFavouriteGroup { from: usize, to: usize },
    MoveFavouriteGroupLeft(usize),
    MoveFavouriteGroupRight(usize),
    OpenGroupInNewTabs(i32),
    ToggleGroupDropdown(i32),
    CloseDropdowns,

    // host targets
    OpenTargetInNewTab(HostTarget),
    SaveTargetAsFavourite(HostTarget),

    // host history
    HostBack,
    HostForward,

    // preferences
    ToggleTabBar,
    ToggleFavBar,
    HideFavBar,
    ToggleBadge(BadgeScope, BadgeKind),
    SetTabWidthMin(u32),
    ToggleCompactStyle,
    ToggleAlwaysFocusNewTabs,
    ToggleStandardNav,
    ToggleReopenLastChannel,
}
