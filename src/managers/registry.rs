//! Entry Registry.
//!
//! Owns the ordered tabs, favourites and favourite groups together with the
//! display preferences, and is the only place they are mutated. Every
//! applied mutation snapshots the whole state and saves it before returning;
//! navigation requests go out through the [`NavigationBridge`] afterwards.
//!
//! Invalid inputs (out-of-range indices, empty names) are no-ops and make the
//! operation return `false`.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::services::host_adapter::HostAdapter;
use crate::services::location_resolver::{self, ResolvedLocation};
use crate::services::navigation_bridge::NavigationBridge;
use crate::services::settings_engine::{SaveOutcome, SettingsEngineTrait};
use crate::types::favourite::{Favourite, FavouriteGroup};
use crate::types::settings::{BadgeKind, BadgeScope, BarPreferences, BarSettings, CURRENT_SCHEMA_VERSION};
use crate::types::tab::{channel_url, Tab};

/// Which tabs `close_tab` removes, relative to the given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseMode {
    /// Just the tab at the index.
    Single,
    /// Every tab except the one at the index.
    Other,
    /// Every tab left of the index.
    Left,
    /// Every tab right of the index.
    Right,
}

/// Trait defining the tab side of the registry.
pub trait RegistryTrait {
    fn switch_to_tab(&mut self, index: usize) -> bool;
    fn close_tab(&mut self, index: usize, mode: CloseMode) -> bool;
    fn move_tab(&mut self, from: usize, to: usize) -> bool;
    fn move_tab_left(&mut self, index: usize) -> bool;
    fn move_tab_right(&mut self, index: usize) -> bool;
    fn minimize_tab(&mut self, index: usize) -> bool;
    fn save_channel(&mut self, guild_id: Option<&str>, channel_id: &str, name: &str, icon_url: &str) -> bool;
    fn open_new_tab(&mut self) -> bool;
    fn duplicate_tab(&mut self, index: usize) -> bool;
    fn open_location_in_new_tab(&mut self, location: ResolvedLocation) -> bool;
    fn next_tab(&mut self) -> bool;
    fn previous_tab(&mut self) -> bool;
    fn close_current_tab(&mut self) -> bool;
    fn apply_location(&mut self, location: ResolvedLocation) -> bool;
}

pub struct Registry {
    pub(crate) tabs: Vec<Tab>,
    pub(crate) favs: Vec<Favourite>,
    pub(crate) groups: Vec<FavouriteGroup>,
    pub(crate) prefs: BarPreferences,
    pub(crate) host: Rc<HostAdapter>,
    pub(crate) bridge: NavigationBridge,
    engine: Rc<dyn SettingsEngineTrait>,
    last_save: Cell<Option<SaveOutcome>>,
}

/// Builds a tab from a resolved location.
pub fn tab_from_location(location: ResolvedLocation, selected: bool) -> Tab {
    Tab {
        url: location.url,
        name: location.name,
        icon_url: location.icon_url,
        channel_id: location.channel_id,
        selected,
        minimized: false,
    }
}

/// Where the host currently is, resolved for display.
pub fn current_location(host: &HostAdapter) -> ResolvedLocation {
    let selection = host.selection();
    location_resolver::resolve(host, &selection.current_path(), selection.selected_channel_id(None))
}

/// Leaves exactly one tab selected: the first selected one, or the first tab.
fn normalize_selection(tabs: &mut [Tab]) -> bool {
    let keep = tabs.iter().position(|t| t.selected).unwrap_or(0);
    let mut changed = false;
    for (i, tab) in tabs.iter_mut().enumerate() {
        let selected = i == keep;
        changed |= tab.selected != selected;
        tab.selected = selected;
    }
    changed
}

/// Index one step left or right of `index`, wrapping at the ends.
pub(crate) fn wrapped_step(index: usize, len: usize, right: bool) -> Option<usize> {
    if len <= 1 || index >= len {
        return None;
    }
    Some(if right { (index + 1) % len } else { (index + len - 1) % len })
}

/// Remove-and-reinsert; `false` when out of range or a no-op.
pub(crate) fn reorder<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

impl Registry {
    /// Takes ownership of loaded settings.
    ///
    /// With no persisted tabs, one selected tab for the host's current
    /// location is created.
    pub fn new(
        settings: BarSettings,
        host: Rc<HostAdapter>,
        bridge: NavigationBridge,
        engine: Rc<dyn SettingsEngineTrait>,
    ) -> Self {
        let BarSettings {
            mut tabs,
            favs,
            fav_groups,
            preferences,
            ..
        } = settings;

        let mut changed = false;
        if tabs.is_empty() {
            tabs.push(tab_from_location(current_location(&host), true));
            changed = true;
        }
        changed |= normalize_selection(&mut tabs);

        let registry = Self {
            tabs,
            favs,
            groups: fav_groups,
            prefs: preferences,
            host,
            bridge,
            engine,
            last_save: Cell::new(None),
        };
        if changed {
            registry.commit();
        }
        registry
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn favs(&self) -> &[Favourite] {
        &self.favs
    }

    pub fn groups(&self) -> &[FavouriteGroup] {
        &self.groups
    }

    pub fn preferences(&self) -> &BarPreferences {
        &self.prefs
    }

    pub fn host(&self) -> &HostAdapter {
        &self.host
    }

    pub fn selected_index(&self) -> usize {
        self.tabs.iter().position(|t| t.selected).unwrap_or(0)
    }

    pub fn selected_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.selected_index())
    }

    /// The full persisted document for the current state.
    pub fn snapshot(&self) -> BarSettings {
        BarSettings {
            schema_version: CURRENT_SCHEMA_VERSION,
            tabs: self.tabs.clone(),
            favs: self.favs.clone(),
            fav_groups: self.groups.clone(),
            preferences: self.prefs.clone(),
        }
    }

    /// Outcome of the most recent save, if any.
    pub fn last_save(&self) -> Option<SaveOutcome> {
        self.last_save.get()
    }

    pub(crate) fn commit(&self) -> SaveOutcome {
        let outcome = self.engine.save(&self.snapshot());
        self.last_save.set(Some(outcome));
        outcome
    }

    fn select(&mut self, index: usize) {
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.selected = i == index;
        }
    }

    /// Appends a tab, selecting it and navigating when `focus` is set.
    pub(crate) fn push_tab(&mut self, mut tab: Tab, focus: bool) {
        tab.selected = false;
        self.tabs.push(tab);
        let index = self.tabs.len() - 1;
        if focus {
            self.select(index);
        }
        self.commit();
        if focus {
            self.navigate_to_selected();
        }
    }

    fn navigate_to_selected(&self) {
        if let Some(tab) = self.selected_tab() {
            self.bridge.navigate(&tab.url);
        }
    }

    // --- preferences ---

    /// Applies `change` to the preferences and saves.
    pub fn update_preferences(&mut self, change: impl FnOnce(&mut BarPreferences)) {
        change(&mut self.prefs);
        self.commit();
    }

    pub fn toggle_tab_bar(&mut self) {
        self.update_preferences(|p| p.show_tab_bar = !p.show_tab_bar);
    }

    pub fn toggle_fav_bar(&mut self) {
        self.update_preferences(|p| p.show_fav_bar = !p.show_fav_bar);
    }

    pub fn hide_fav_bar(&mut self) {
        self.update_preferences(|p| p.show_fav_bar = false);
    }

    pub fn toggle_badge(&mut self, scope: BadgeScope, kind: BadgeKind) {
        self.update_preferences(|p| p.toggle_badge(scope, kind));
    }

    pub fn set_tab_width_min(&mut self, width: u32) {
        self.update_preferences(|p| p.tab_width_min = width);
    }

    pub fn toggle_compact_style(&mut self) {
        self.update_preferences(|p| p.compact_style = !p.compact_style);
    }

    pub fn toggle_always_focus_new_tabs(&mut self) {
        self.update_preferences(|p| p.always_focus_new_tabs = !p.always_focus_new_tabs);
    }

    pub fn toggle_standard_nav(&mut self) {
        self.update_preferences(|p| p.use_standard_nav = !p.use_standard_nav);
    }

    pub fn toggle_reopen_last_channel(&mut self) {
        self.update_preferences(|p| p.reopen_last_channel = !p.reopen_last_channel);
    }
}

impl RegistryTrait for Registry {
    /// Selects the tab at `index` and navigates the host to it.
    fn switch_to_tab(&mut self, index: usize) -> bool {
        if index >= self.tabs.len() {
            return false;
        }
        debug!(index, "switching tab");
        self.select(index);
        self.commit();
        self.navigate_to_selected();
        true
    }

    /// Closes tabs according to `mode`. The last remaining tab is never closed.
    ///
    /// If the selected tab survives it stays selected. Otherwise selection
    /// moves to its left neighbour (`Single`, first tab at index 0) or to the
    /// anchor tab, and the host is navigated there.
    fn close_tab(&mut self, index: usize, mode: CloseMode) -> bool {
        let len = self.tabs.len();
        if len <= 1 || index >= len {
            return false;
        }
        let keep = |i: usize| match mode {
            CloseMode::Single => i != index,
            CloseMode::Other => i == index,
            CloseMode::Left => i >= index,
            CloseMode::Right => i <= index,
        };
        if (0..len).all(keep) {
            return false;
        }

        let selected_survives = keep(self.selected_index());
        let anchor = match mode {
            CloseMode::Single => None,
            CloseMode::Other | CloseMode::Left => Some(0),
            CloseMode::Right => Some(index),
        };
        let old = std::mem::take(&mut self.tabs);
        self.tabs = old
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep(*i))
            .map(|(_, t)| t)
            .collect();
        debug!(index, ?mode, remaining = self.tabs.len(), "closed tabs");

        if selected_survives {
            self.commit();
            return true;
        }
        let next = anchor.unwrap_or_else(|| index.saturating_sub(1));
        self.select(next);
        self.commit();
        self.navigate_to_selected();
        true
    }

    fn move_tab(&mut self, from: usize, to: usize) -> bool {
        if !reorder(&mut self.tabs, from, to) {
            return false;
        }
        debug!(from, to, "moved tab");
        self.commit();
        true
    }

    fn move_tab_left(&mut self, index: usize) -> bool {
        wrapped_step(index, self.tabs.len(), false).is_some_and(|to| self.move_tab(index, to))
    }

    fn move_tab_right(&mut self, index: usize) -> bool {
        wrapped_step(index, self.tabs.len(), true).is_some_and(|to| self.move_tab(index, to))
    }

    fn minimize_tab(&mut self, index: usize) -> bool {
        let Some(tab) = self.tabs.get_mut(index) else {
            return false;
        };
        tab.minimized = !tab.minimized;
        self.commit();
        true
    }

    /// Appends a tab for a channel. It is focused only with `alwaysFocusNewTabs`.
    fn save_channel(&mut self, guild_id: Option<&str>, channel_id: &str, name: &str, icon_url: &str) -> bool {
        let tab = Tab {
            url: channel_url(guild_id, channel_id),
            name: name.to_string(),
            icon_url: icon_url.to_string(),
            channel_id: Some(channel_id.to_string()),
            selected: false,
            minimized: false,
        };
        debug!(url = %tab.url, "saving channel as tab");
        let focus = self.prefs.always_focus_new_tabs;
        self.push_tab(tab, focus);
        true
    }

    /// Appends a Friends tab and selects it.
    fn open_new_tab(&mut self) -> bool {
        let friends = Tab::friends();
        let location = location_resolver::resolve(&self.host, &friends.url, None);
        self.push_tab(tab_from_location(location, false), true);
        true
    }

    /// Appends an unselected copy of the tab at `index`.
    fn duplicate_tab(&mut self, index: usize) -> bool {
        let Some(tab) = self.tabs.get(index) else {
            return false;
        };
        let copy = Tab {
            selected: false,
            minimized: false,
            ..tab.clone()
        };
        self.push_tab(copy, false);
        true
    }

    fn open_location_in_new_tab(&mut self, location: ResolvedLocation) -> bool {
        let focus = self.prefs.always_focus_new_tabs;
        self.push_tab(tab_from_location(location, false), focus);
        true
    }

    fn next_tab(&mut self) -> bool {
        let len = self.tabs.len();
        if len <= 1 {
            return false;
        }
        self.switch_to_tab((self.selected_index() + 1) % len)
    }

    fn previous_tab(&mut self) -> bool {
        let len = self.tabs.len();
        if len <= 1 {
            return false;
        }
        self.switch_to_tab((self.selected_index() + len - 1) % len)
    }

    fn close_current_tab(&mut self) -> bool {
        self.close_tab(self.selected_index(), CloseMode::Single)
    }

    /// Points the selected tab at a new location, keeping its `minimized` flag.
    fn apply_location(&mut self, location: ResolvedLocation) -> bool {
        let index = self.selected_index();
        let Some(tab) = self.tabs.get_mut(index) else {
            return false;
        };
        debug!(index, url = %location.url, "selected tab follows host navigation");
        let minimized = tab.minimized;
        *tab = tab_from_location(location, true);
        tab.minimized = minimized;
        self.commit();
        true
    }
}
