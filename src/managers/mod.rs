// ChannelTabs state managers
// Managers own and mutate bar state: the entry registry, favourites, commands,
// gestures, drag reordering, context menus and shortcuts.

pub mod command;
pub mod context_menu;
pub mod drag_controller;
pub mod favourites;
pub mod gestures;
pub mod registry;
pub mod shortcut_manager;
