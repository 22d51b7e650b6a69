//! Derived-State Aggregator.
//!
//! Pure functions computing unread/mention/typing/presence badges for tabs,
//! favourites and favourite groups from the host's stores. Nothing here
//! mutates registry data; callers re-run these on every store change.

use std::collections::HashSet;

use crate::services::host_adapter::HostAdapter;
use crate::services::location_resolver::resolve_status;
use crate::types::badges::{EntryState, GroupState};
use crate::types::favourite::Favourite;
use crate::types::host::ChannelKind;
use crate::types::tab::Tab;

/// Unread count with mention and boolean fallbacks: the first non-zero value wins.
fn unread_with_fallback(host: &HostAdapter, channel_id: &str) -> u32 {
    let unread = host.unread();
    let count = unread.unread_count(channel_id);
    if count > 0 {
        return count;
    }
    let mentions = unread.mention_count(channel_id);
    if mentions > 0 {
        return mentions;
    }
    u32::from(unread.has_unread(channel_id))
}

fn is_estimated(host: &HostAdapter, channel_id: &str) -> bool {
    let unread = host.unread();
    unread.is_estimated(channel_id)
        || (unread.has_unread(channel_id) && unread.unread_count(channel_id) == 0)
}

/// Ids of users typing in a channel, excluding the current user, de-duplicated.
/// Channels unknown to the directory report nobody.
pub fn typing_users(host: &HostAdapter, channel_id: &str) -> Vec<String> {
    if host.directory().channel(channel_id).is_none() {
        return Vec::new();
    }
    let self_id = host.directory().current_user_id();
    let mut seen = HashSet::new();
    host.typing()
        .typing_user_ids(channel_id)
        .into_iter()
        .filter(|uid| Some(uid) != self_id.as_ref())
        .filter(|uid| seen.insert(uid.clone()))
        .collect()
}

pub fn is_channel_typing(host: &HostAdapter, channel_id: &str) -> bool {
    !typing_users(host, channel_id).is_empty()
}

/// Whether the channel is a DM or group DM.
pub fn is_private_channel(host: &HostAdapter, channel_id: &str) -> bool {
    host.directory()
        .channel(channel_id)
        .is_some_and(|c| c.is_private())
}

/// Badge state of a single channel target.
pub fn channel_state(host: &HostAdapter, channel_id: Option<&str>, url: &str) -> EntryState {
    let Some(cid) = channel_id else {
        return EntryState {
            current_status: resolve_status(host, url),
            ..EntryState::default()
        };
    };
    let unread = host.unread();
    EntryState {
        unread_count: unread_with_fallback(host, cid),
        unread_estimated: is_estimated(host, cid),
        has_unread: unread.has_unread(cid),
        mention_count: unread.mention_count(cid),
        selected: host.selection().selected_channel_id(None).as_deref() == Some(cid),
        is_typing: is_channel_typing(host, cid),
        current_status: resolve_status(host, url),
    }
}

/// Channel ids a guild bookmark aggregates over: text-like, viewable, unmuted.
pub fn aggregated_guild_channels(host: &HostAdapter, guild_id: &str) -> Vec<String> {
    host.directory()
        .guild_channels(guild_id)
        .into_iter()
        .filter(|c| !matches!(c.kind, ChannelKind::GuildVoice | ChannelKind::GuildCategory))
        .filter(|c| host.access().can_view_channel(c))
        .filter(|c| !host.access().is_channel_muted(guild_id, &c.id))
        .map(|c| c.id)
        .collect()
}

/// Badge state of a guild bookmark: counts summed and flags OR-ed over its channels.
pub fn guild_state(host: &HostAdapter, guild_id: &str, channel_id: Option<&str>, url: &str) -> EntryState {
    let unread = host.unread();
    let mut state = EntryState {
        selected: host.selection().selected_guild_id().as_deref() == Some(guild_id),
        is_typing: channel_id.is_some_and(|cid| is_channel_typing(host, cid)),
        current_status: resolve_status(host, url),
        ..EntryState::default()
    };
    for cid in aggregated_guild_channels(host, guild_id) {
        state.unread_count += unread_with_fallback(host, &cid);
        state.unread_estimated |= is_estimated(host, &cid);
        state.has_unread |= unread.has_unread(&cid);
        state.mention_count += unread.mention_count(&cid);
    }
    state
}

pub fn favourite_state(host: &HostAdapter, fav: &Favourite) -> EntryState {
    match &fav.guild_id {
        Some(gid) => guild_state(host, gid, fav.channel_id.as_deref(), &fav.url),
        None => channel_state(host, fav.channel_id.as_deref(), &fav.url),
    }
}

/// Channel state of a tab; `selected` is the tab's own flag, not the host's selection.
pub fn tab_state(host: &HostAdapter, tab: &Tab) -> EntryState {
    EntryState {
        selected: tab.selected,
        ..channel_state(host, tab.channel_id.as_deref(), &tab.url)
    }
}

/// Badge state of a favourite group.
///
/// DM and group-DM members contribute their mention count and typing status
/// but not their unread count, estimate or has-unread flag.
pub fn group_state(host: &HostAdapter, favs: &[Favourite], group_id: i32) -> GroupState {
    let mut state = GroupState::default();
    for fav in favs.iter().filter(|f| f.group_id == group_id) {
        let private = fav
            .channel_id
            .as_deref()
            .is_some_and(|cid| is_private_channel(host, cid));
        let entry = favourite_state(host, fav);
        if !private {
            state.unread_count += entry.unread_count;
            state.unread_estimated |= entry.unread_estimated;
            state.has_unread |= entry.has_unread;
        }
        state.mention_count += entry.mention_count;
        state.is_typing |= entry.is_typing;
    }
    state
}

/// Tooltip text for a typing indicator.
///
/// Unresolvable ids are counted but not named. No ids at all gives the
/// generic text used by the aggregated group indicator.
pub fn typing_tooltip_text(host: &HostAdapter, user_ids: Option<&[String]>) -> String {
    let user_ids = match user_ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => return "Someone is Typing...".to_string(),
    };
    let names: Vec<String> = user_ids
        .iter()
        .filter_map(|uid| host.directory().user(uid))
        .map(|u| u.username)
        .collect();

    let Some(first) = names.first() else {
        let n = user_ids.len();
        return format!("{} user{}", n, if n == 1 { "" } else { "s" });
    };
    let others = user_ids.len() - 1;
    match others {
        0 => first.clone(),
        1 => format!("{} and 1 other", first),
        k => format!("{} and {} others", first, k),
    }
}
