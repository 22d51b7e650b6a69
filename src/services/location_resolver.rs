//! Location Resolver.
//!
//! Turns a host path into the display name, icon and presence shown on a tab
//! or favourite. Five target shapes are told apart: guild channel, DM, group
//! DM, guild without a selected channel, and non-channel application routes.
//! Resolution never fails; unknown ids fall back to a placeholder icon and to
//! the raw path as the name.

use crate::services::host_adapter::HostAdapter;
use crate::types::host::{ChannelInfo, PresenceStatus, UserInfo};
use crate::types::tab::FRIENDS_URL;

pub const DEFAULT_ICON_GREY: &str = "https://cdn.discordapp.com/embed/avatars/0.png";
pub const DEFAULT_ICON_GREEN: &str = "https://cdn.discordapp.com/embed/avatars/1.png";
pub const DEFAULT_ICON_BLUE: &str = "https://cdn.discordapp.com/embed/avatars/2.png";

/// The `/channels/<guild>/<channel>` segments of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelPath<'a> {
    pub guild_segment: Option<&'a str>,
    pub channel_segment: Option<&'a str>,
}

impl<'a> ChannelPath<'a> {
    /// The guild segment when it names a real guild rather than `@me` / `@favorites`.
    pub fn guild_id(&self) -> Option<&'a str> {
        self.guild_segment
            .filter(|g| !is_private_scope(g))
    }
}

fn is_private_scope(segment: &str) -> bool {
    segment == "@me" || segment == "@favorites"
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// `\w+(-\w+)*`
fn is_word_slug(s: &str) -> bool {
    !s.is_empty()
        && s.split('-')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_'))
}

/// Splits a host path into its guild and channel segments.
pub fn parse_channel_path(path: &str) -> ChannelPath<'_> {
    let Some(rest) = path.strip_prefix("/channels/") else {
        return ChannelPath::default();
    };
    let mut segments = rest.split('/');
    let guild = segments
        .next()
        .filter(|g| is_digits(g) || is_private_scope(g));
    let Some(guild) = guild else {
        return ChannelPath::default();
    };
    let channel = segments.next().filter(|c| is_word_slug(c));
    ChannelPath {
        guild_segment: Some(guild),
        channel_segment: channel,
    }
}

/// Channel id of a `/channels/<x>/<digits>` url with nothing after it.
pub fn channel_id_from_url(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("/channels/")?;
    let (scope, channel) = rest.split_once('/')?;
    if scope.is_empty() || channel.contains('/') || !is_digits(channel) {
        return None;
    }
    Some(channel)
}

/// Everything a tab stores about where it points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub url: String,
    pub name: String,
    pub icon_url: String,
    pub channel_id: Option<String>,
    pub status: PresenceStatus,
}

/// Resolves a location. `channel_id` overrides the id parsed from the path,
/// e.g. the host's selected channel for guild-only paths.
pub fn resolve(host: &HostAdapter, path: &str, channel_id: Option<String>) -> ResolvedLocation {
    let channel_id = channel_id.or_else(|| {
        parse_channel_path(path)
            .channel_segment
            .filter(|c| is_digits(c))
            .map(str::to_string)
    });
    ResolvedLocation {
        url: path.to_string(),
        name: resolve_name(host, path),
        icon_url: resolve_icon_url(host, path),
        channel_id,
        status: resolve_status(host, path),
    }
}

fn recipient_label(host: &HostAdapter, user: &UserInfo) -> String {
    if let Some(nick) = host.directory().nickname(&user.id) {
        return nick;
    }
    match &user.display_name {
        Some(name) => name.clone(),
        None if user.bot => format!("BOT (@{})", user.username),
        None => user.username.clone(),
    }
}

fn channel_label(channel: &ChannelInfo) -> Option<String> {
    if let Some(name) = &channel.name {
        return Some(if channel.is_group_dm() {
            name.clone()
        } else {
            format!("#{}", name)
        });
    }
    None
}

/// Display name for a path.
pub fn resolve_name(host: &HostAdapter, path: &str) -> String {
    let parsed = parse_channel_path(path);
    let directory = host.directory();

    if let Some(cid) = parsed.channel_segment {
        let channel = directory.channel(cid);
        if let Some(label) = channel.as_ref().and_then(channel_label) {
            return label;
        }
        if let Some(guild) = parsed.guild_id().and_then(|g| directory.guild(g)) {
            return guild.name;
        }
        if let Some(channel) = channel.filter(|c| !c.recipients.is_empty()) {
            return channel
                .recipients
                .iter()
                .map(|u| recipient_label(host, u))
                .collect::<Vec<_>>()
                .join(", ");
        }
        return path.to_string();
    }

    if path == FRIENDS_URL {
        return "Friends".to_string();
    }
    if let Some(gid) = parsed.guild_id() {
        return directory
            .guild(gid)
            .map(|g| g.name)
            .unwrap_or_else(|| path.to_string());
    }
    if let Some(route) = app_route_name(path) {
        return route;
    }
    path.to_string()
}

/// `/guild-discovery` → `Guild Discovery`.
fn app_route_name(path: &str) -> Option<String> {
    let route = path.strip_prefix('/')?;
    if route.is_empty() || !route.chars().all(|c| c.is_ascii_lowercase() || c == '-') {
        return None;
    }
    Some(
        route
            .split('-')
            .map(|part| {
                let mut chars = part.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// Icon url for a path, or one of the default avatars.
pub fn resolve_icon_url(host: &HostAdapter, path: &str) -> String {
    let parsed = parse_channel_path(path);
    let directory = host.directory();

    let Some(cid) = parsed.channel_segment else {
        return match parsed.guild_id().and_then(|g| directory.guild(g)) {
            Some(guild) => guild.icon_url.unwrap_or_else(|| DEFAULT_ICON_BLUE.to_string()),
            None => DEFAULT_ICON_GREY.to_string(),
        };
    };

    let channel = directory.channel(cid);
    let guild_id = channel
        .as_ref()
        .and_then(|c| c.guild_id.clone())
        .or_else(|| parsed.guild_id().map(str::to_string));

    if let Some(gid) = guild_id {
        return match directory.guild(&gid) {
            Some(guild) => guild.icon_url.unwrap_or_else(|| DEFAULT_ICON_BLUE.to_string()),
            None => DEFAULT_ICON_GREY.to_string(),
        };
    }

    match channel {
        Some(c) if c.is_dm() => c
            .recipient_id()
            .and_then(|uid| directory.user(uid))
            .and_then(|u| u.avatar_url)
            .unwrap_or_else(|| DEFAULT_ICON_GREY.to_string()),
        Some(c) if c.is_group_dm() => match &c.icon {
            Some(icon) => format!(
                "https://cdn.discordapp.com/channel-icons/{}/{}.webp",
                c.id, icon
            ),
            None => DEFAULT_ICON_GREEN.to_string(),
        },
        _ => DEFAULT_ICON_GREY.to_string(),
    }
}

/// Presence of the DM counterpart, `None` for everything else.
pub fn resolve_status(host: &HostAdapter, path: &str) -> PresenceStatus {
    let Some(cid) = parse_channel_path(path).channel_segment else {
        return PresenceStatus::None;
    };
    host.directory()
        .channel(cid)
        .filter(|c| c.is_dm())
        .and_then(|c| c.recipient_id().map(|uid| host.presence().status(uid)))
        .unwrap_or(PresenceStatus::None)
}
