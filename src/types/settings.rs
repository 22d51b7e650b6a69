use serde::{Deserialize, Serialize};

use super::favourite::{Favourite, FavouriteGroup};
use super::tab::Tab;

/// Current persisted schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// The full persisted document: the three collections plus display preferences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BarSettings {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub tabs: Vec<Tab>,
    #[serde(default)]
    pub favs: Vec<Favourite>,
    #[serde(default)]
    pub fav_groups: Vec<FavouriteGroup>,
    #[serde(flatten)]
    pub preferences: BarPreferences,
}

impl Default for BarSettings {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            tabs: Vec::new(),
            favs: Vec::new(),
            fav_groups: Vec::new(),
            preferences: BarPreferences::default(),
        }
    }
}

/// Where a badge is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeScope {
    Favourite,
    Tab,
    ActiveTab,
    FavouriteGroup,
}

impl BadgeScope {
    pub const ALL: [BadgeScope; 4] = [
        BadgeScope::Favourite,
        BadgeScope::Tab,
        BadgeScope::ActiveTab,
        BadgeScope::FavouriteGroup,
    ];
}

/// Which badge is drawn. `Empty` controls whether zero counts are still shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BadgeKind {
    Unread,
    Mention,
    Typing,
    Empty,
}

impl BadgeKind {
    pub const ALL: [BadgeKind; 4] = [
        BadgeKind::Unread,
        BadgeKind::Mention,
        BadgeKind::Typing,
        BadgeKind::Empty,
    ];
}

/// Display preferences, stored flat next to the collections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BarPreferences {
    pub show_tab_bar: bool,
    pub show_fav_bar: bool,
    pub reopen_last_channel: bool,

    pub show_fav_unread_badges: bool,
    pub show_fav_mention_badges: bool,
    pub show_fav_typing_badge: bool,
    pub show_empty_fav_badges: bool,

    pub show_tab_unread_badges: bool,
    pub show_tab_mention_badges: bool,
    pub show_tab_typing_badge: bool,
    pub show_empty_tab_badges: bool,

    pub show_active_tab_unread_badges: bool,
    pub show_active_tab_mention_badges: bool,
    pub show_active_tab_typing_badge: bool,
    pub show_empty_active_tab_badges: bool,

    pub show_fav_group_unread_badges: bool,
    pub show_fav_group_mention_badges: bool,
    pub show_fav_group_typing_badge: bool,
    pub show_empty_fav_group_badges: bool,

    pub compact_style: bool,
    pub privacy_mode: bool,
    pub radial_status_mode: bool,
    pub tab_width_min: u32,
    pub show_quick_settings: bool,
    pub show_nav_buttons: bool,
    pub always_focus_new_tabs: bool,
    pub use_standard_nav: bool,
}

impl Default for BarPreferences {
    fn default() -> Self {
        Self {
            show_tab_bar: true,
            show_fav_bar: true,
            reopen_last_channel: false,

            show_fav_unread_badges: true,
            show_fav_mention_badges: true,
            show_fav_typing_badge: true,
            show_empty_fav_badges: false,

            show_tab_unread_badges: true,
            show_tab_mention_badges: true,
            show_tab_typing_badge: true,
            show_empty_tab_badges: false,

            show_active_tab_unread_badges: false,
            show_active_tab_mention_badges: false,
            show_active_tab_typing_badge: false,
            show_empty_active_tab_badges: false,

            show_fav_group_unread_badges: true,
            show_fav_group_mention_badges: true,
            show_fav_group_typing_badge: true,
            show_empty_fav_group_badges: false,

            compact_style: false,
            privacy_mode: false,
            radial_status_mode: false,
            tab_width_min: 100,
            show_quick_settings: true,
            show_nav_buttons: true,
            always_focus_new_tabs: false,
            use_standard_nav: true,
        }
    }
}

impl BarPreferences {
    fn badge_flag_mut(&mut self, scope: BadgeScope, kind: BadgeKind) -> &mut bool {
        use BadgeKind as K;
        use BadgeScope as S;
        match (scope, kind) {
            (S::Favourite, K::Unread) => &mut self.show_fav_unread_badges,
            (S::Favourite, K::Mention) => &mut self.show_fav_mention_badges,
            (S::Favourite, K::Typing) => &mut self.show_fav_typing_badge,
            (S::Favourite, K::Empty) => &mut self.show_empty_fav_badges,
            (S::Tab, K::Unread) => &mut self.show_tab_unread_badges,
            (S::Tab, K::Mention) => &mut self.show_tab_mention_badges,
            (S::Tab, K::Typing) => &mut self.show_tab_typing_badge,
            (S::Tab, K::Empty) => &mut self.show_empty_tab_badges,
            (S::ActiveTab, K::Unread) => &mut self.show_active_tab_unread_badges,
            (S::ActiveTab, K::Mention) => &mut self.show_active_tab_mention_badges,
            (S::ActiveTab, K::Typing) => &mut self.show_active_tab_typing_badge,
            (S::ActiveTab, K::Empty) => &mut self.show_empty_active_tab_badges,
            (S::FavouriteGroup, K::Unread) => &mut self.show_fav_group_unread_badges,
            (S::FavouriteGroup, K::Mention) => &mut self.show_fav_group_mention_badges,
            (S::FavouriteGroup, K::Typing) => &mut self.show_fav_group_typing_badge,
            (S::FavouriteGroup, K::Empty) => &mut self.show_empty_fav_group_badges,
        }
    }

    pub fn badge_visible(&self, scope: BadgeScope, kind: BadgeKind) -> bool {
        use BadgeKind as K;
        use BadgeScope as S;
        match (scope, kind) {
            (S::Favourite, K::Unread) => self.show_fav_unread_badges,
            (S::Favourite, K::Mention) => self.show_fav_mention_badges,
            (S::Favourite, K::Typing) => self.show_fav_typing_badge,
            (S::Favourite, K::Empty) => self.show_empty_fav_badges,
            (S::Tab, K::Unread) => self.show_tab_unread_badges,
            (S::Tab, K::Mention) => self.show_tab_mention_badges,
            (S::Tab, K::Typing) => self.show_tab_typing_badge,
            (S::Tab, K::Empty) => self.show_empty_tab_badges,
            (S::ActiveTab, K::Unread) => self.show_active_tab_unread_badges,
            (S::ActiveTab, K::Mention) => self.show_active_tab_mention_badges,
            (S::ActiveTab, K::Typing) => self.show_active_tab_typing_badge,
            (S::ActiveTab, K::Empty) => self.show_empty_active_tab_badges,
            (S::FavouriteGroup, K::Unread) => self.show_fav_group_unread_badges,
            (S::FavouriteGroup, K::Mention) => self.show_fav_group_mention_badges,
            (S::FavouriteGroup, K::Typing) => self.show_fav_group_typing_badge,
            (S::FavouriteGroup, K::Empty) => self.show_empty_fav_group_badges,
        }
    }

    pub fn set_badge_visible(&mut self, scope: BadgeScope, kind: BadgeKind, visible: bool) {
        *self.badge_flag_mut(scope, kind) = visible;
    }

    pub fn toggle_badge(&mut self, scope: BadgeScope, kind: BadgeKind) {
        let flag = self.badge_flag_mut(scope, kind);
        *flag = !*flag;
    }
}
