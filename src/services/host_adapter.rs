//! Host Adapter.
//!
//! Fixed, read-only query interfaces over the host chat client's stores plus
//! the two commands the core issues (navigation, store subscription). The
//! host binds one implementation of each interface once at startup through
//! [`HostCapabilities`]; [`HostAdapter::resolve`] substitutes inert stubs for
//! optional capabilities that are missing and refuses to start without the
//! fatal ones.

use std::rc::Rc;

use tracing::warn;

use crate::types::errors::HostError;
use crate::types::host::{ChannelInfo, GuildInfo, PresenceStatus, UserInfo};

/// Unread and mention counters per channel.
pub trait UnreadSource {
    fn unread_count(&self, channel_id: &str) -> u32;
    fn mention_count(&self, channel_id: &str) -> u32;
    fn is_estimated(&self, channel_id: &str) -> bool;
    fn has_unread(&self, channel_id: &str) -> bool;
}

/// Users currently typing in a channel.
pub trait TypingSource {
    fn typing_user_ids(&self, channel_id: &str) -> Vec<String>;
}

/// Presence of users.
pub trait PresenceSource {
    fn status(&self, user_id: &str) -> PresenceStatus;
}

/// Channel, guild and user metadata.
pub trait Directory {
    fn channel(&self, channel_id: &str) -> Option<ChannelInfo>;
    fn guild_channels(&self, guild_id: &str) -> Vec<ChannelInfo>;
    fn guild(&self, guild_id: &str) -> Option<GuildInfo>;
    fn user(&self, user_id: &str) -> Option<UserInfo>;
    fn current_user_id(&self) -> Option<String>;
    /// Friend nickname set by the current user.
    fn nickname(&self, user_id: &str) -> Option<String>;
}

/// Permission and mute checks used to scope guild-level aggregation.
pub trait AccessPolicy {
    fn can_view_channel(&self, channel: &ChannelInfo) -> bool;
    fn is_channel_muted(&self, guild_id: &str, channel_id: &str) -> bool;
}

/// What the host currently shows.
pub trait Selection {
    /// Selected channel, globally or within the given guild.
    fn selected_channel_id(&self, guild_id: Option<&str>) -> Option<String>;
    fn selected_guild_id(&self) -> Option<String>;
    /// Path of the current location, e.g. `/channels/@me`.
    fn current_path(&self) -> String;
}

/// Host navigation commands.
pub trait Navigator {
    fn navigate_to(&self, url: &str);
    fn navigate_back(&self);
    fn navigate_forward(&self);
}

pub type ListenerId = u64;

/// Change notifications from the host's stores.
pub trait StoreSubscriptions {
    fn subscribe(&self, listener: Rc<dyn Fn()>) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
}

/// Whatever the host could provide. `None` marks a capability it could not locate.
#[derive(Default, Clone)]
pub struct HostCapabilities {
    pub unread: Option<Rc<dyn UnreadSource>>,
    pub typing: Option<Rc<dyn TypingSource>>,
    pub presence: Option<Rc<dyn PresenceSource>>,
    pub directory: Option<Rc<dyn Directory>>,
    pub access: Option<Rc<dyn AccessPolicy>>,
    pub selection: Option<Rc<dyn Selection>>,
    pub navigator: Option<Rc<dyn Navigator>>,
    pub subscriptions: Option<Rc<dyn StoreSubscriptions>>,
}

pub const FEATURE_UNREADS: &str = "Unread/Mention Indicators";
pub const FEATURE_TYPING: &str = "Typing Indicators";
pub const FEATURE_PRESENCE: &str = "Status Indicators";
pub const FEATURE_NAMES: &str = "Names and Icons";
pub const FEATURE_ACCESS: &str = "Guild Unread Filtering";
pub const FEATURE_SELECTION: &str = "Selection Tracking";

/// Features that degraded to inert stubs, reported once as one notice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MissingFeatures {
    features: Vec<String>,
}

impl MissingFeatures {
    fn push(&mut self, feature: &str) {
        warn!(feature, "host capability unavailable, using inert stub");
        if !self.features.iter().any(|f| f == feature) {
            self.features.push(feature.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// The aggregated user-visible notice, if anything is missing.
    pub fn notice(&self) -> Option<String> {
        if self.features.is_empty() {
            None
        } else {
            Some(format!(
                "These features are unavailable: {}",
                self.features.join(", ")
            ))
        }
    }
}

/// The resolved host binding every other component queries.
#[derive(Clone)]
pub struct HostAdapter {
    unread: Rc<dyn UnreadSource>,
    typing: Rc<dyn TypingSource>,
    presence: Rc<dyn PresenceSource>,
    directory: Rc<dyn Directory>,
    access: Rc<dyn AccessPolicy>,
    selection: Rc<dyn Selection>,
    navigator: Rc<dyn Navigator>,
    subscriptions: Rc<dyn StoreSubscriptions>,
    missing: MissingFeatures,
}

impl HostAdapter {
    /// Binds the host's capabilities.
    ///
    /// Store subscriptions and navigation are required; every other
    /// capability falls back to an inert stub and is listed in
    /// [`HostAdapter::missing_features`].
    pub fn resolve(caps: HostCapabilities) -> Result<Self, HostError> {
        let subscriptions = caps
            .subscriptions
            .ok_or_else(|| HostError::MissingCapability("StoreSubscriptions".to_string()))?;
        let navigator = caps
            .navigator
            .ok_or_else(|| HostError::MissingCapability("Navigator".to_string()))?;

        let mut missing = MissingFeatures::default();
        let unread = caps.unread.unwrap_or_else(|| {
            missing.push(FEATURE_UNREADS);
            Rc::new(InertUnread)
        });
        let typing = caps.typing.unwrap_or_else(|| {
            missing.push(FEATURE_TYPING);
            Rc::new(InertTyping)
        });
        let presence = caps.presence.unwrap_or_else(|| {
            missing.push(FEATURE_PRESENCE);
            Rc::new(InertPresence)
        });
        let directory = caps.directory.unwrap_or_else(|| {
            missing.push(FEATURE_NAMES);
            Rc::new(InertDirectory)
        });
        let access = caps.access.unwrap_or_else(|| {
            missing.push(FEATURE_ACCESS);
            Rc::new(OpenAccess)
        });
        let selection = caps.selection.unwrap_or_else(|| {
            missing.push(FEATURE_SELECTION);
            Rc::new(InertSelection)
        });

        Ok(Self {
            unread,
            typing,
            presence,
            directory,
            access,
            selection,
            navigator,
            subscriptions,
            missing,
        })
    }

    pub fn unread(&self) -> &dyn UnreadSource {
        self.unread.as_ref()
    }

    pub fn typing(&self) -> &dyn TypingSource {
        self.typing.as_ref()
    }

    pub fn presence(&self) -> &dyn PresenceSource {
        self.presence.as_ref()
    }

    pub fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    pub fn access(&self) -> &dyn AccessPolicy {
        self.access.as_ref()
    }

    pub fn selection(&self) -> &dyn Selection {
        self.selection.as_ref()
    }

    pub fn navigator(&self) -> Rc<dyn Navigator> {
        Rc::clone(&self.navigator)
    }

    pub fn subscriptions(&self) -> Rc<dyn StoreSubscriptions> {
        Rc::clone(&self.subscriptions)
    }

    pub fn missing_features(&self) -> &MissingFeatures {
        &self.missing
    }
}

// --- Inert stubs ---

struct InertUnread;

impl UnreadSource for InertUnread {
    fn unread_count(&self, _channel_id: &str) -> u32 {
        0
    }
    fn mention_count(&self, _channel_id: &str) -> u32 {
        0
    }
    fn is_estimated(&self, _channel_id: &str) -> bool {
        false
    }
    fn has_unread(&self, _channel_id: &str) -> bool {
        false
    }
}

struct InertTyping;

impl TypingSource for InertTyping {
    fn typing_user_ids(&self, _channel_id: &str) -> Vec<String> {
        Vec::new()
    }
}

struct InertPresence;

impl PresenceSource for InertPresence {
    fn status(&self, _user_id: &str) -> PresenceStatus {
        PresenceStatus::None
    }
}

struct InertDirectory;

impl Directory for InertDirectory {
    fn channel(&self, _channel_id: &str) -> Option<ChannelInfo> {
        None
    }
    fn guild_channels(&self, _guild_id: &str) -> Vec<ChannelInfo> {
        Vec::new()
    }
    fn guild(&self, _guild_id: &str) -> Option<GuildInfo> {
        None
    }
    fn user(&self, _user_id: &str) -> Option<UserInfo> {
        None
    }
    fn current_user_id(&self) -> Option<String> {
        None
    }
    fn nickname(&self, _user_id: &str) -> Option<String> {
        None
    }
}

struct OpenAccess;

impl AccessPolicy for OpenAccess {
    fn can_view_channel(&self, _channel: &ChannelInfo) -> bool {
        true
    }
    fn is_channel_muted(&self, _guild_id: &str, _channel_id: &str) -> bool {
        false
    }
}

struct InertSelection;

impl Selection for InertSelection {
    fn selected_channel_id(&self, _guild_id: Option<&str>) -> Option<String> {
        None
    }
    fn selected_guild_id(&self) -> Option<String> {
        None
    }
    fn current_path(&self) -> String {
        crate::types::tab::FRIENDS_URL.to_string()
    }
}
