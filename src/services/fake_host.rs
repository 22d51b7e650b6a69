//! In-process scripted host.
//!
//! Implements every host interface over plain maps so tests and the demo
//! binary can drive the core without a real chat client. Navigation requests
//! are recorded and, when a hook is installed, echoed back synchronously the
//! way the real host fires its location-changed event.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::host_adapter::{
    AccessPolicy, Directory, HostCapabilities, ListenerId, Navigator, PresenceSource, Selection,
    StoreSubscriptions, TypingSource, UnreadSource,
};
use crate::managers::drag_controller::{CaptureId, PointerCapture};
use crate::services::location_resolver::parse_channel_path;
use crate::types::host::{ChannelInfo, ChannelKind, GuildInfo, PresenceStatus, UserInfo};

#[derive(Debug, Clone, Copy, Default)]
struct UnreadEntry {
    unread: u32,
    mentions: u32,
    estimated: bool,
    has_unread: bool,
}

type NavigateHook = Box<dyn Fn(&str)>;

#[derive(Default)]
pub struct FakeHost {
    channels: RefCell<HashMap<String, ChannelInfo>>,
    guilds: RefCell<HashMap<String, GuildInfo>>,
    users: RefCell<HashMap<String, UserInfo>>,
    nicknames: RefCell<HashMap<String, String>>,
    current_user: RefCell<Option<String>>,
    unread: RefCell<HashMap<String, UnreadEntry>>,
    typing: RefCell<HashMap<String, Vec<String>>>,
    presence: RefCell<HashMap<String, PresenceStatus>>,
    hidden: RefCell<HashSet<String>>,
    muted: RefCell<HashSet<String>>,
    path: RefCell<String>,
    selected_in_guild: RefCell<HashMap<String, String>>,
    navigations: RefCell<Vec<String>>,
    on_navigate: RefCell<Option<NavigateHook>>,
    back_count: Cell<u32>,
    forward_count: Cell<u32>,
    listeners: RefCell<Vec<(ListenerId, Rc<dyn Fn()>)>>,
    next_listener: Cell<ListenerId>,
    captures: RefCell<HashSet<CaptureId>>,
    next_capture: Cell<CaptureId>,
}

impl FakeHost {
    pub fn new() -> Rc<Self> {
        let host = Self::default();
        *host.path.borrow_mut() = crate::types::tab::FRIENDS_URL.to_string();
        Rc::new(host)
    }

    /// Every capability bound to this host.
    pub fn capabilities(self: &Rc<Self>) -> HostCapabilities {
        HostCapabilities {
            unread: Some(self.clone()),
            typing: Some(self.clone()),
            presence: Some(self.clone()),
            directory: Some(self.clone()),
            access: Some(self.clone()),
            selection: Some(self.clone()),
            navigator: Some(self.clone()),
            subscriptions: Some(self.clone()),
        }
    }

    // --- scripting ---

    pub fn add_guild(&self, id: &str, name: &str, icon_url: Option<&str>) {
        self.guilds.borrow_mut().insert(
            id.to_string(),
            GuildInfo {
                id: id.to_string(),
                name: name.to_string(),
                icon_url: icon_url.map(str::to_string),
            },
        );
    }

    pub fn add_guild_channel(&self, guild_id: &str, id: &str, name: &str, kind: ChannelKind) {
        self.channels.borrow_mut().insert(
            id.to_string(),
            ChannelInfo {
                id: id.to_string(),
                guild_id: Some(guild_id.to_string()),
                parent_id: None,
                name: Some(name.to_string()),
                kind,
                recipients: Vec::new(),
                icon: None,
            },
        );
    }

    pub fn add_thread(&self, guild_id: &str, id: &str, parent_id: &str, name: &str) {
        self.channels.borrow_mut().insert(
            id.to_string(),
            ChannelInfo {
                id: id.to_string(),
                guild_id: Some(guild_id.to_string()),
                parent_id: Some(parent_id.to_string()),
                name: Some(name.to_string()),
                kind: ChannelKind::Thread,
                recipients: Vec::new(),
                icon: None,
            },
        );
    }

    pub fn add_user(&self, id: &str, username: &str, display_name: Option<&str>) {
        self.users.borrow_mut().insert(
            id.to_string(),
            UserInfo {
                id: id.to_string(),
                username: username.to_string(),
                display_name: display_name.map(str::to_string),
                bot: false,
                avatar_url: Some(format!("https://cdn.example/avatars/{}.png", id)),
            },
        );
    }

    pub fn add_dm(&self, id: &str, recipient_id: &str) {
        let recipient = self.users.borrow().get(recipient_id).cloned();
        self.channels.borrow_mut().insert(
            id.to_string(),
            ChannelInfo {
                id: id.to_string(),
                guild_id: None,
                parent_id: None,
                name: None,
                kind: ChannelKind::DirectMessage,
                recipients: recipient.into_iter().collect(),
                icon: None,
            },
        );
    }

    pub fn add_group_dm(&self, id: &str, name: Option<&str>, recipient_ids: &[&str], icon: Option<&str>) {
        let users = self.users.borrow();
        let recipients = recipient_ids
            .iter()
            .filter_map(|uid| users.get(*uid).cloned())
            .collect();
        self.channels.borrow_mut().insert(
            id.to_string(),
            ChannelInfo {
                id: id.to_string(),
                guild_id: None,
                parent_id: None,
                name: name.map(str::to_string),
                kind: ChannelKind::GroupDm,
                recipients,
                icon: icon.map(str::to_string),
            },
        );
    }

    pub fn set_current_user(&self, id: &str) {
        *self.current_user.borrow_mut() = Some(id.to_string());
    }

    pub fn set_nickname(&self, user_id: &str, nickname: &str) {
        self.nicknames
            .borrow_mut()
            .insert(user_id.to_string(), nickname.to_string());
    }

    pub fn set_unread(&self, channel_id: &str, unread: u32, mentions: u32, estimated: bool, has_unread: bool) {
        self.unread.borrow_mut().insert(
            channel_id.to_string(),
            UnreadEntry {
                unread,
                mentions,
                estimated,
                has_unread,
            },
        );
    }

    pub fn set_typing(&self, channel_id: &str, user_ids: &[&str]) {
        self.typing.borrow_mut().insert(
            channel_id.to_string(),
            user_ids.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn set_status(&self, user_id: &str, status: PresenceStatus) {
        self.presence.borrow_mut().insert(user_id.to_string(), status);
    }

    pub fn hide_channel(&self, channel_id: &str) {
        self.hidden.borrow_mut().insert(channel_id.to_string());
    }

    pub fn mute_channel(&self, channel_id: &str) {
        self.muted.borrow_mut().insert(channel_id.to_string());
    }

    /// Moves the host to `path` without recording a navigation request,
    /// as when the user navigates through the host's own UI.
    pub fn set_path(&self, path: &str) {
        *self.path.borrow_mut() = path.to_string();
        let parsed = parse_channel_path(path);
        if let (Some(guild), Some(channel)) = (parsed.guild_segment, parsed.channel_segment) {
            self.selected_in_guild
                .borrow_mut()
                .insert(guild.to_string(), channel.to_string());
        }
    }

    pub fn set_on_navigate(&self, hook: impl Fn(&str) + 'static) {
        *self.on_navigate.borrow_mut() = Some(Box::new(hook));
    }

    /// Fires every store-change listener.
    pub fn notify_change(&self) {
        let listeners: Vec<Rc<dyn Fn()>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    // --- observation ---

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    pub fn last_navigation(&self) -> Option<String> {
        self.navigations.borrow().last().cloned()
    }

    pub fn back_count(&self) -> u32 {
        self.back_count.get()
    }

    pub fn forward_count(&self) -> u32 {
        self.forward_count.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Document-level pointer captures not yet released.
    pub fn active_captures(&self) -> usize {
        self.captures.borrow().len()
    }
}

impl UnreadSource for FakeHost {
    fn unread_count(&self, channel_id: &str) -> u32 {
        self.unread.borrow().get(channel_id).map_or(0, |e| e.unread)
    }
    fn mention_count(&self, channel_id: &str) -> u32 {
        self.unread.borrow().get(channel_id).map_or(0, |e| e.mentions)
    }
    fn is_estimated(&self, channel_id: &str) -> bool {
        self.unread.borrow().get(channel_id).is_some_and(|e| e.estimated)
    }
    fn has_unread(&self, channel_id: &str) -> bool {
        self.unread.borrow().get(channel_id).is_some_and(|e| e.has_unread)
    }
}

impl TypingSource for FakeHost {
    fn typing_user_ids(&self, channel_id: &str) -> Vec<String> {
        self.typing.borrow().get(channel_id).cloned().unwrap_or_default()
    }
}

impl PresenceSource for FakeHost {
    fn status(&self, user_id: &str) -> PresenceStatus {
        self.presence
            .borrow()
            .get(user_id)
            .copied()
            .unwrap_or(PresenceStatus::Offline)
    }
}

impl Directory for FakeHost {
    fn channel(&self, channel_id: &str) -> Option<ChannelInfo> {
        self.channels.borrow().get(channel_id).cloned()
    }

    fn guild_channels(&self, guild_id: &str) -> Vec<ChannelInfo> {
        let mut channels: Vec<ChannelInfo> = self
            .channels
            .borrow()
            .values()
            .filter(|c| c.guild_id.as_deref() == Some(guild_id))
            .cloned()
            .collect();
        channels.sort_by(|a, b| a.id.cmp(&b.id));
        channels
    }

    fn guild(&self, guild_id: &str) -> Option<GuildInfo> {
        self.guilds.borrow().get(guild_id).cloned()
    }

    fn user(&self, user_id: &str) -> Option<UserInfo> {
        self.users.borrow().get(user_id).cloned()
    }

    fn current_user_id(&self) -> Option<String> {
        self.current_user.borrow().clone()
    }

    fn nickname(&self, user_id: &str) -> Option<String> {
        self.nicknames.borrow().get(user_id).cloned()
    }
}

impl AccessPolicy for FakeHost {
    fn can_view_channel(&self, channel: &ChannelInfo) -> bool {
        !self.hidden.borrow().contains(&channel.id)
    }
    fn is_channel_muted(&self, _guild_id: &str, channel_id: &str) -> bool {
        self.muted.borrow().contains(channel_id)
    }
}

impl Selection for FakeHost {
    fn selected_channel_id(&self, guild_id: Option<&str>) -> Option<String> {
        match guild_id {
            Some(g) => self.selected_in_guild.borrow().get(g).cloned(),
            None => parse_channel_path(&self.path.borrow())
                .channel_segment
                .map(str::to_string),
        }
    }

    fn selected_guild_id(&self) -> Option<String> {
        parse_channel_path(&self.path.borrow())
            .guild_id()
            .map(str::to_string)
    }

    fn current_path(&self) -> String {
        self.path.borrow().clone()
    }
}

impl Navigator for FakeHost {
    fn navigate_to(&self, url: &str) {
        self.navigations.borrow_mut().push(url.to_string());
        self.set_path(url);
        if let Some(hook) = self.on_navigate.borrow().as_ref() {
            hook(url);
        }
    }

    fn navigate_back(&self) {
        self.back_count.set(self.back_count.get() + 1);
    }

    fn navigate_forward(&self) {
        self.forward_count.set(self.forward_count.get() + 1);
    }
}

impl StoreSubscriptions for FakeHost {
    fn subscribe(&self, listener: Rc<dyn Fn()>) -> ListenerId {
        let id = self.next_listener.get() + 1;
        self.next_listener.set(id);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }
}

impl PointerCapture for FakeHost {
    fn capture(&self) -> CaptureId {
        let id = self.next_capture.get() + 1;
        self.next_capture.set(id);
        self.captures.borrow_mut().insert(id);
        id
    }

    fn release(&self, id: CaptureId) {
        self.captures.borrow_mut().remove(&id);
    }
}
