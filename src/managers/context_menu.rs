//! Context menus.
//!
//! Builds the menus for tabs, favourites, groups and the favourites bar,
//! plus the entries added to the host's own channel, DM and guild menus.
//! A menu is plain data; choosing an item yields its [`Command`].

use std::fmt;

use crate::managers::command::{Command, HostTarget};
use crate::managers::registry::{CloseMode, Registry};
use crate::services::host_adapter::HostAdapter;
use crate::services::location_resolver;
use crate::types::favourite::UNGROUPED;
use crate::types::host::ChannelKind;
use crate::types::settings::BarPreferences;
use crate::types::tab::channel_url;

/// Label of the submenu added to host menus.
pub const HOST_SUBMENU_LABEL: &str = "ChannelTabs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub label: String,
    pub command: Option<Command>,
    pub danger: bool,
    /// Toggle items carry their current state.
    pub checked: Option<bool>,
}

impl MenuItem {
    fn action(label: &str, command: Command) -> Self {
        Self {
            label: label.to_string(),
            command: Some(command),
            danger: false,
            checked: None,
        }
    }

    fn danger(label: &str, command: Command) -> Self {
        Self {
            danger: true,
            ..Self::action(label, command)
        }
    }

    fn toggle(label: &str, checked: bool, command: Command) -> Self {
        Self {
            checked: Some(checked),
            ..Self::action(label, command)
        }
    }

    fn disabled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            command: None,
            danger: false,
            checked: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.command.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Item(MenuItem),
    Submenu { label: String, entries: Vec<MenuEntry> },
    Separator,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Menu {
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    fn item(&mut self, item: MenuItem) {
        self.entries.push(MenuEntry::Item(item));
    }

    fn separator(&mut self) {
        self.entries.push(MenuEntry::Separator);
    }

    fn submenu(&mut self, label: &str, entries: Vec<MenuEntry>) {
        self.entries.push(MenuEntry::Submenu {
            label: label.to_string(),
            entries,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels of the top-level items and submenus, separators skipped.
    pub fn labels(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                MenuEntry::Item(item) => Some(item.label.as_str()),
                MenuEntry::Submenu { label, .. } => Some(label.as_str()),
                MenuEntry::Separator => None,
            })
            .collect()
    }

    /// Entries of the named top-level submenu.
    pub fn submenu_entries(&self, label: &str) -> Option<Menu> {
        self.entries.iter().find_map(|e| match e {
            MenuEntry::Submenu { label: l, entries } if l == label => Some(Menu {
                entries: entries.clone(),
            }),
            _ => None,
        })
    }

    /// First item with `label`, searching submenus depth-first.
    pub fn find(&self, label: &str) -> Option<&MenuItem> {
        fn walk<'a>(entries: &'a [MenuEntry], label: &str) -> Option<&'a MenuItem> {
            entries.iter().find_map(|e| match e {
                MenuEntry::Item(item) if item.label == label => Some(item),
                MenuEntry::Submenu { entries, .. } => walk(entries, label),
                _ => None,
            })
        }
        walk(&self.entries, label)
    }

    /// Command behind `label`, if the item exists and is enabled.
    pub fn choose(&self, label: &str) -> Option<Command> {
        self.find(label).and_then(|item| item.command.clone())
    }
}

impl fmt::Display for Menu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_entries(f: &mut fmt::Formatter<'_>, entries: &[MenuEntry], depth: usize) -> fmt::Result {
            let indent = "  ".repeat(depth);
            for entry in entries {
                match entry {
                    MenuEntry::Item(item) => {
                        let mark = match item.checked {
                            Some(true) => "[x] ",
                            Some(false) => "[ ] ",
                            None => "",
                        };
                        writeln!(f, "{}{}{}", indent, mark, item.label)?;
                    }
                    MenuEntry::Submenu { label, entries } => {
                        writeln!(f, "{}{} >", indent, label)?;
                        write_entries(f, entries, depth + 1)?;
                    }
                    MenuEntry::Separator => writeln!(f, "{}---", indent)?,
                }
            }
            Ok(())
        }
        write_entries(f, &self.entries, 0)
    }
}

/// Text input used by rename and "create group" items.
pub trait Prompt {
    /// `None` when the user cancels.
    fn ask(&self, title: &str, initial: &str) -> Option<String>;
}

pub fn tab_menu(registry: &Registry, index: usize) -> Menu {
    let mut menu = Menu::default();
    let Some(tab) = registry.tabs().get(index) else {
        return menu;
    };
    let count = registry.tabs().len();

    menu.item(MenuItem::action("Duplicate", Command::DuplicateTab(index)));
    menu.item(MenuItem::action("Add to favourites", Command::AddTabToFavourites(index)));
    menu.item(MenuItem::toggle("Minimize tab", tab.minimized, Command::MinimizeTab(index)));

    if count > 1 {
        menu.separator();
        menu.item(MenuItem::action("Move left", Command::MoveTabLeft(index)));
        menu.item(MenuItem::action("Move right", Command::MoveTabRight(index)));

        let mut close = vec![
            MenuEntry::Item(MenuItem::danger("Close tab", Command::CloseTab(index, CloseMode::Single))),
            MenuEntry::Item(MenuItem::danger(
                "Close all other tabs",
                Command::CloseTab(index, CloseMode::Other),
            )),
        ];
        if index != count - 1 {
            close.push(MenuEntry::Item(MenuItem::danger(
                "Close all tabs to right",
                Command::CloseTab(index, CloseMode::Right),
            )));
        }
        if index != 0 {
            close.push(MenuEntry::Item(MenuItem::danger(
                "Close all tabs to left",
                Command::CloseTab(index, CloseMode::Left),
            )));
        }
        menu.separator();
        menu.submenu("Close...", close);
    }
    menu
}

pub fn fav_menu(registry: &Registry, index: usize) -> Menu {
    let mut menu = Menu::default();
    let Some(fav) = registry.favs().get(index) else {
        return menu;
    };

    menu.item(MenuItem::action("Open in new tab", Command::OpenFavInNewTab(index)));
    menu.item(MenuItem::action("Rename", Command::RenameFavourite(index)));
    menu.item(MenuItem::toggle(
        "Minimize favourite",
        fav.minimized,
        Command::MinimizeFavourite(index),
    ));
    menu.separator();

    if registry.favs().len() > 1 {
        menu.item(MenuItem::action("Move left", Command::MoveFavouriteLeft(index)));
        menu.item(MenuItem::action("Move right", Command::MoveFavouriteRight(index)));
        menu.separator();
    }

    let mut targets = vec![
        MenuEntry::Item(MenuItem::danger(
            "Favorites Bar",
            Command::MoveToGroup {
                index,
                group_id: UNGROUPED,
            },
        )),
        MenuEntry::Separator,
    ];
    if registry.groups().is_empty() {
        targets.push(MenuEntry::Item(MenuItem::disabled("No groups")));
    }
    for group in registry.groups() {
        targets.push(MenuEntry::Item(MenuItem::action(
            &group.name,
            Command::MoveToGroup {
                index,
                group_id: group.group_id,
            },
        )));
    }
    menu.submenu("Move To...", targets);
    menu.separator();

    menu.item(MenuItem::danger("Delete", Command::DeleteFavourite(index)));
    menu
}

pub fn group_menu(registry: &Registry, group_id: i32) -> Menu {
    let mut menu = Menu::default();
    let groups = registry.groups();
    let Some(position) = groups.iter().position(|g| g.group_id == group_id) else {
        return menu;
    };

    menu.item(MenuItem::action("Open all", Command::OpenGroupInNewTabs(group_id)));
    menu.separator();
    if groups.len() > 1 {
        menu.item(MenuItem::action("Move left", Command::MoveFavouriteGroupLeft(position)));
        menu.item(MenuItem::action("Move right", Command::MoveFavouriteGroupRight(position)));
        menu.separator();
    }
    menu.item(MenuItem::action("Rename", Command::RenameFavouriteGroup(group_id)));
    menu.separator();
    menu.item(MenuItem::danger("Delete", Command::RemoveFavouriteGroup(group_id)));
    menu
}

pub fn fav_bar_menu() -> Menu {
    let mut menu = Menu::default();
    menu.item(MenuItem::action(
        "Add current tab as favourite",
        Command::AddCurrentToFavourites,
    ));
    menu.item(MenuItem::action("Create a new group...", Command::AddFavouriteGroup));
    menu.separator();
    menu.item(MenuItem::danger("Hide Favorites", Command::HideFavBar));
    menu
}

// --- host menus ---

/// Tab items shown with the tab bar, favourite items with the favourites bar.
fn merge_items(prefs: &BarPreferences, tab_items: Vec<MenuItem>, fav_items: Vec<MenuItem>) -> Option<Menu> {
    let mut items = Vec::new();
    if prefs.show_tab_bar {
        items.extend(tab_items);
    }
    if prefs.show_fav_bar {
        items.extend(fav_items);
    }
    if items.is_empty() {
        return None;
    }
    let mut menu = Menu::default();
    menu.submenu(
        HOST_SUBMENU_LABEL,
        items.into_iter().map(MenuEntry::Item).collect(),
    );
    Some(menu)
}

/// Entries for the host's context menu of a channel, thread, DM or group DM.
pub fn host_channel_menu(host: &HostAdapter, prefs: &BarPreferences, channel_id: &str) -> Option<Menu> {
    let channel = host.directory().channel(channel_id)?;
    let url = channel_url(channel.guild_id.as_deref(), &channel.id);
    let name = location_resolver::resolve_name(host, &url);

    let (icon_url, fav_label) = match channel.kind {
        ChannelKind::Thread => {
            let parent = channel
                .parent_id
                .as_deref()
                .map(|p| channel_url(channel.guild_id.as_deref(), p))
                .unwrap_or_else(|| url.clone());
            (location_resolver::resolve_icon_url(host, &parent), "Save thread as bookmark")
        }
        ChannelKind::DirectMessage => (location_resolver::resolve_icon_url(host, &url), "Save DM as bookmark"),
        ChannelKind::GroupDm => (location_resolver::resolve_icon_url(host, &url), "Save bookmark"),
        _ => (location_resolver::resolve_icon_url(host, &url), "Save channel as bookmark"),
    };

    let target = HostTarget {
        guild_id: channel.guild_id.clone(),
        channel_id: Some(channel.id.clone()),
        name,
        icon_url,
    };
    merge_items(
        prefs,
        vec![MenuItem::action(
            "Open in new tab",
            Command::OpenTargetInNewTab(target.clone()),
        )],
        vec![MenuItem::action(fav_label, Command::SaveTargetAsFavourite(target))],
    )
}

/// Entries for the host's context menu of a guild. The channel items refer
/// to the channel currently selected in that guild and are left out when
/// there is none.
pub fn host_guild_menu(host: &HostAdapter, prefs: &BarPreferences, guild_id: &str) -> Option<Menu> {
    let guild = host.directory().guild(guild_id)?;
    let icon_url = guild.icon_url.clone().unwrap_or_default();

    let mut tab_items = Vec::new();
    let mut fav_items = Vec::new();
    let selected = host
        .selection()
        .selected_channel_id(Some(guild_id))
        .and_then(|cid| host.directory().channel(&cid));
    if let Some(channel) = selected {
        let target = HostTarget {
            guild_id: Some(guild_id.to_string()),
            channel_id: Some(channel.id.clone()),
            name: format!("#{}", channel.name.clone().unwrap_or_default()),
            icon_url: icon_url.clone(),
        };
        tab_items.push(MenuItem::action(
            "Open channel in new tab",
            Command::OpenTargetInNewTab(target.clone()),
        ));
        tab_items.push(MenuItem::action(
            "Save channel as bookmark",
            Command::SaveTargetAsFavourite(target),
        ));
    }
    fav_items.push(MenuItem::action(
        "Save guild as bookmark",
        Command::SaveTargetAsFavourite(HostTarget {
            guild_id: Some(guild_id.to_string()),
            channel_id: None,
            name: guild.name,
            icon_url,
        }),
    ));
    merge_items(prefs, tab_items, fav_items)
}
