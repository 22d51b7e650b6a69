//! Store-change watcher and badge snapshots.
//!
//! [`StoreWatcher`] keeps one host store subscription alive for as long as
//! it exists. On every notification the owner recomputes a whole
//! [`BadgeSnapshot`] and swaps it in, so readers never see a half-updated set
//! of badges.

use std::rc::Rc;

use tracing::debug;

use crate::services::derived_state;
use crate::services::host_adapter::{HostAdapter, ListenerId, StoreSubscriptions};
use crate::types::badges::{EntryState, GroupState};
use crate::types::settings::{BadgeKind, BadgeScope, BarPreferences, BarSettings};

/// Subscription handle; unsubscribes on drop.
pub struct StoreWatcher {
    subscriptions: Rc<dyn StoreSubscriptions>,
    id: ListenerId,
}

impl StoreWatcher {
    pub fn attach(subscriptions: Rc<dyn StoreSubscriptions>, listener: Rc<dyn Fn()>) -> Self {
        let id = subscriptions.subscribe(listener);
        debug!(id, "subscribed to host store changes");
        Self { subscriptions, id }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }
}

impl Drop for StoreWatcher {
    fn drop(&mut self) {
        debug!(id = self.id, "unsubscribing from host store changes");
        self.subscriptions.unsubscribe(self.id);
    }
}

/// Derived state of every entry, index-aligned with the registry collections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeSnapshot {
    pub tabs: Vec<EntryState>,
    pub favs: Vec<EntryState>,
    pub groups: Vec<(i32, GroupState)>,
}

impl BadgeSnapshot {
    pub fn compute(host: &HostAdapter, settings: &BarSettings) -> Self {
        Self {
            tabs: settings
                .tabs
                .iter()
                .map(|t| derived_state::tab_state(host, t))
                .collect(),
            favs: settings
                .favs
                .iter()
                .map(|f| derived_state::favourite_state(host, f))
                .collect(),
            groups: settings
                .fav_groups
                .iter()
                .map(|g| (g.group_id, derived_state::group_state(host, &settings.favs, g.group_id)))
                .collect(),
        }
    }

    pub fn group(&self, group_id: i32) -> Option<&GroupState> {
        self.groups
            .iter()
            .find(|(id, _)| *id == group_id)
            .map(|(_, state)| state)
    }
}

/// Which badges to draw for one entry, after applying display preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BadgeDisplay {
    /// Unread label, `"5"` or `"5+"` when estimated.
    pub unread: Option<String>,
    pub mention: Option<u32>,
    pub typing: bool,
}

fn unread_label(count: u32, estimated: bool) -> String {
    format!("{}{}", count, if estimated { "+" } else { "" })
}

/// Whether an entry pointing at `channel_id` can carry an unread badge.
pub fn has_unread_target(host: &HostAdapter, channel_id: Option<&str>) -> bool {
    channel_id.is_some_and(|cid| !derived_state::is_private_channel(host, cid))
}

/// Badges for a tab or favourite.
///
/// Private channels and targets without a channel never get an unread badge.
/// Selected tabs use the active-tab flags.
pub fn entry_badges(
    prefs: &BarPreferences,
    scope: BadgeScope,
    state: &EntryState,
    has_unread_target: bool,
) -> BadgeDisplay {
    let scope = match scope {
        BadgeScope::Tab if state.selected => BadgeScope::ActiveTab,
        other => other,
    };
    let show_empty = prefs.badge_visible(scope, BadgeKind::Empty);

    let unread = (prefs.badge_visible(scope, BadgeKind::Unread)
        && has_unread_target
        && (state.has_unread || show_empty))
        .then(|| unread_label(state.unread_count, state.unread_estimated));
    let mention = (prefs.badge_visible(scope, BadgeKind::Mention)
        && (state.mention_count > 0 || show_empty))
        .then_some(state.mention_count);

    BadgeDisplay {
        unread,
        mention,
        typing: prefs.badge_visible(scope, BadgeKind::Typing) && state.is_typing,
    }
}

pub fn group_badges(prefs: &BarPreferences, state: &GroupState) -> BadgeDisplay {
    let scope = BadgeScope::FavouriteGroup;
    let show_empty = prefs.badge_visible(scope, BadgeKind::Empty);
    BadgeDisplay {
        unread: (prefs.badge_visible(scope, BadgeKind::Unread) && (state.has_unread || show_empty))
            .then(|| unread_label(state.unread_count, state.unread_estimated)),
        mention: (prefs.badge_visible(scope, BadgeKind::Mention)
            && (state.mention_count > 0 || show_empty))
            .then_some(state.mention_count),
        typing: prefs.badge_visible(scope, BadgeKind::Typing) && state.is_typing,
    }
}
