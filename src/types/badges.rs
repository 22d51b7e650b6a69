use super::host::PresenceStatus;

/// Presentation state derived from host stores for one tab or favourite.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryState {
    pub unread_count: u32,
    pub unread_estimated: bool,
    pub has_unread: bool,
    pub mention_count: u32,
    pub selected: bool,
    pub is_typing: bool,
    pub current_status: PresenceStatus,
}

/// Aggregated state of a favourite group.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupState {
    pub unread_count: u32,
    pub unread_estimated: bool,
    pub has_unread: bool,
    pub mention_count: u32,
    pub is_typing: bool,
}
