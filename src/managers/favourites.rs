//! Favourite and favourite-group operations on the [`Registry`].

use tracing::debug;

use super::registry::{reorder, tab_from_location, wrapped_step, Registry};
use crate::services::location_resolver;
use crate::types::favourite::{Favourite, FavouriteGroup, UNGROUPED};

pub const DEFAULT_GROUP_NAME: &str = "New Group";

/// Trait defining the favourites side of the registry.
pub trait FavouritesTrait {
    fn add_to_favourites(
        &mut self,
        name: &str,
        icon_url: &str,
        url: &str,
        channel_id: Option<&str>,
        guild_id: Option<&str>,
    ) -> bool;
    fn rename_favourite(&mut self, index: usize, name: &str) -> bool;
    fn delete_favourite(&mut self, index: usize) -> bool;
    fn minimize_favourite(&mut self, index: usize) -> bool;
    fn move_favourite(&mut self, from: usize, to: usize) -> bool;
    fn move_favourite_left(&mut self, index: usize) -> bool;
    fn move_favourite_right(&mut self, index: usize) -> bool;
    fn move_to_group(&mut self, index: usize, group_id: i32) -> bool;
    fn remove_from_group(&mut self, index: usize) -> bool;
    fn add_favourite_group(&mut self, name: &str) -> Option<i32>;
    fn remove_favourite_group(&mut self, group_id: i32) -> bool;
    fn rename_favourite_group(&mut self, group_id: i32, name: &str) -> bool;
    fn move_favourite_group(&mut self, from: usize, to: usize) -> bool;
    fn move_favourite_group_left(&mut self, index: usize) -> bool;
    fn move_favourite_group_right(&mut self, index: usize) -> bool;
    fn refresh_icons(&mut self) -> bool;
    fn open_fav_in_new_tab(&mut self, index: usize) -> bool;
    fn open_fav_group_in_new_tabs(&mut self, group_id: i32) -> usize;
}

impl Registry {
    /// Smallest non-negative id not used by any group.
    fn next_group_id(&self) -> i32 {
        (0..)
            .find(|id| !self.groups.iter().any(|g| g.group_id == *id))
            .unwrap_or(i32::MAX)
    }

    pub fn group_exists(&self, group_id: i32) -> bool {
        self.groups.iter().any(|g| g.group_id == group_id)
    }

    /// Favourites in display order that belong to `group_id`, with their indices.
    pub fn group_members(&self, group_id: i32) -> Vec<(usize, &Favourite)> {
        self.favs
            .iter()
            .enumerate()
            .filter(|(_, f)| f.group_id == group_id)
            .collect()
    }

    /// Where clicking the favourite goes.
    ///
    /// A guild favourite follows the channel currently selected in that
    /// guild, or the bare guild url when there is none.
    pub fn favourite_target_url(&self, index: usize) -> Option<String> {
        let fav = self.favs.get(index)?;
        let Some(guild_id) = fav.guild_id.as_deref() else {
            return Some(fav.url.clone());
        };
        Some(match self.host.selection().selected_channel_id(Some(guild_id)) {
            Some(channel_id) => format!("/channels/{}/{}", guild_id, channel_id),
            None => format!("/channels/{}", guild_id),
        })
    }
}

impl FavouritesTrait for Registry {
    fn add_to_favourites(
        &mut self,
        name: &str,
        icon_url: &str,
        url: &str,
        channel_id: Option<&str>,
        guild_id: Option<&str>,
    ) -> bool {
        debug!(url, "adding favourite");
        self.favs.push(Favourite {
            name: name.to_string(),
            icon_url: icon_url.to_string(),
            url: url.to_string(),
            channel_id: channel_id.map(str::to_string),
            guild_id: guild_id.map(str::to_string),
            group_id: UNGROUPED,
            minimized: false,
        });
        self.commit();
        true
    }

    /// Empty or whitespace-only names are ignored.
    fn rename_favourite(&mut self, index: usize, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        let Some(fav) = self.favs.get_mut(index) else {
            return false;
        };
        fav.name = name.to_string();
        self.commit();
        true
    }

    fn delete_favourite(&mut self, index: usize) -> bool {
        if index >= self.favs.len() {
            return false;
        }
        let removed = self.favs.remove(index);
        debug!(index, url = %removed.url, "deleted favourite");
        self.commit();
        true
    }

    fn minimize_favourite(&mut self, index: usize) -> bool {
        let Some(fav) = self.favs.get_mut(index) else {
            return false;
        };
        fav.minimized = !fav.minimized;
        self.commit();
        true
    }

    fn move_favourite(&mut self, from: usize, to: usize) -> bool {
        if !reorder(&mut self.favs, from, to) {
            return false;
        }
        self.commit();
        true
    }

    fn move_favourite_left(&mut self, index: usize) -> bool {
        wrapped_step(index, self.favs.len(), false).is_some_and(|to| self.move_favourite(index, to))
    }

    fn move_favourite_right(&mut self, index: usize) -> bool {
        wrapped_step(index, self.favs.len(), true).is_some_and(|to| self.move_favourite(index, to))
    }

    /// `group_id` must name an existing group or be [`UNGROUPED`].
    fn move_to_group(&mut self, index: usize, group_id: i32) -> bool {
        if group_id != UNGROUPED && !self.group_exists(group_id) {
            return false;
        }
        let Some(fav) = self.favs.get_mut(index) else {
            return false;
        };
        fav.group_id = group_id;
        debug!(index, group_id, "moved favourite to group");
        self.commit();
        true
    }

    fn remove_from_group(&mut self, index: usize) -> bool {
        self.move_to_group(index, UNGROUPED)
    }

    /// Creates a group with the smallest free id. `None` for an empty name.
    fn add_favourite_group(&mut self, name: &str) -> Option<i32> {
        if name.trim().is_empty() {
            return None;
        }
        let group_id = self.next_group_id();
        self.groups.push(FavouriteGroup {
            name: name.to_string(),
            group_id,
        });
        debug!(group_id, "added favourite group");
        self.commit();
        Some(group_id)
    }

    /// Removes the group; its members go back to the bar.
    fn remove_favourite_group(&mut self, group_id: i32) -> bool {
        let Some(pos) = self.groups.iter().position(|g| g.group_id == group_id) else {
            return false;
        };
        self.groups.remove(pos);
        for fav in self.favs.iter_mut().filter(|f| f.group_id == group_id) {
            fav.group_id = UNGROUPED;
        }
        debug!(group_id, "removed favourite group");
        self.commit();
        true
    }

    fn rename_favourite_group(&mut self, group_id: i32, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        let Some(group) = self.groups.iter_mut().find(|g| g.group_id == group_id) else {
            return false;
        };
        group.name = name.to_string();
        self.commit();
        true
    }

    fn move_favourite_group(&mut self, from: usize, to: usize) -> bool {
        if !reorder(&mut self.groups, from, to) {
            return false;
        }
        self.commit();
        true
    }

    fn move_favourite_group_left(&mut self, index: usize) -> bool {
        wrapped_step(index, self.groups.len(), false)
            .is_some_and(|to| self.move_favourite_group(index, to))
    }

    fn move_favourite_group_right(&mut self, index: usize) -> bool {
        wrapped_step(index, self.groups.len(), true)
            .is_some_and(|to| self.move_favourite_group(index, to))
    }

    /// Re-resolves every favourite's icon from its url.
    fn refresh_icons(&mut self) -> bool {
        let host = self.host.clone();
        for fav in &mut self.favs {
            fav.icon_url = location_resolver::resolve_icon_url(&host, &fav.url);
        }
        self.commit();
        true
    }

    fn open_fav_in_new_tab(&mut self, index: usize) -> bool {
        let Some(url) = self.favourite_target_url(index) else {
            return false;
        };
        let location = location_resolver::resolve(&self.host, &url, None);
        let focus = self.prefs.always_focus_new_tabs;
        self.push_tab(tab_from_location(location, false), focus);
        true
    }

    /// Opens every member of the group in a new, unfocused tab.
    fn open_fav_group_in_new_tabs(&mut self, group_id: i32) -> usize {
        let urls: Vec<String> = self
            .group_members(group_id)
            .into_iter()
            .filter_map(|(i, _)| self.favourite_target_url(i))
            .collect();
        for url in &urls {
            let location = location_resolver::resolve(&self.host, url, None);
            self.push_tab(tab_from_location(location, false), false);
        }
        urls.len()
    }
}
