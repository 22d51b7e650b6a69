//! Tests for user input translation: clicks, nav buttons, shortcuts, the
//! drag-reorder controller and the context menus.

use std::rc::Rc;

use channeltabs::managers::command::{Command, HostTarget};
use channeltabs::managers::context_menu::{
    fav_bar_menu, fav_menu, group_menu, host_channel_menu, host_guild_menu, tab_menu, HOST_SUBMENU_LABEL,
};
use channeltabs::managers::drag_controller::{DragController, DragKind, DragMove, Point};
use channeltabs::managers::favourites::FavouritesTrait;
use channeltabs::managers::gestures::{on_click, on_shortcut, ClickTarget, MouseButton, NavButton};
use channeltabs::managers::registry::{CloseMode, Registry};
use channeltabs::managers::shortcut_manager::{
    KeyChord, KeyEvent, ShortcutAction, ShortcutManager, ShortcutManagerTrait,
};
use channeltabs::services::fake_host::FakeHost;
use channeltabs::services::host_adapter::HostAdapter;
use channeltabs::services::kv_store::MemoryStore;
use channeltabs::services::location_resolver::DEFAULT_ICON_GREEN;
use channeltabs::services::navigation_bridge::NavigationBridge;
use channeltabs::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use channeltabs::types::errors::ShortcutError;
use channeltabs::types::favourite::UNGROUPED;
use channeltabs::types::host::ChannelKind;
use channeltabs::types::settings::{BarPreferences, BarSettings};
use channeltabs::types::tab::Tab;
use rstest::rstest;

fn scripted_host() -> Rc<FakeHost> {
    let host = FakeHost::new();
    host.add_user("200", "alice", Some("Alice"));
    host.add_guild("1", "Rustaceans", Some("https://cdn.example/icons/1.png"));
    host.add_guild_channel("1", "11", "general", ChannelKind::GuildText);
    host.add_dm("21", "200");
    host.add_group_dm("22", Some("Weekend"), &["200"], None);
    host.add_thread("1", "41", "11", "release-planning");
    host
}

fn registry(host: &Rc<FakeHost>, tabs: usize) -> Registry {
    let adapter = Rc::new(HostAdapter::resolve(host.capabilities()).unwrap());
    let bridge = NavigationBridge::new(adapter.navigator());
    let engine: Rc<dyn SettingsEngineTrait> = Rc::new(SettingsEngine::new(Rc::new(MemoryStore::new()), None));
    let mut settings = BarSettings::default();
    for i in 0..tabs {
        settings.tabs.push(Tab {
            selected: i == 0,
            ..Tab::friends()
        });
    }
    Registry::new(settings, adapter, bridge, engine)
}

// ---------------------------------------------------------------------------
// Clicks
// ---------------------------------------------------------------------------

#[test]
fn test_entry_clicks() {
    let tab = |index, selected| ClickTarget::Tab { index, selected };
    assert_eq!(on_click(tab(2, false), MouseButton::Primary, true), Some(Command::SwitchToTab(2)));
    assert_eq!(on_click(tab(2, true), MouseButton::Primary, true), None);
    assert_eq!(
        on_click(tab(2, true), MouseButton::Middle, true),
        Some(Command::CloseTab(2, CloseMode::Single))
    );
    assert_eq!(on_click(tab(2, false), MouseButton::Secondary, true), None);

    assert_eq!(
        on_click(ClickTarget::Favourite(1), MouseButton::Primary, true),
        Some(Command::VisitFavourite(1))
    );
    assert_eq!(
        on_click(ClickTarget::Favourite(1), MouseButton::Middle, true),
        Some(Command::OpenFavInNewTab(1))
    );
    assert_eq!(
        on_click(ClickTarget::Group(4), MouseButton::Primary, true),
        Some(Command::ToggleGroupDropdown(4))
    );
    assert_eq!(
        on_click(ClickTarget::Elsewhere, MouseButton::Primary, true),
        Some(Command::CloseDropdowns)
    );
}

#[rstest]
#[case::standard_left_primary(true, NavButton::Left, MouseButton::Primary, Command::HostBack)]
#[case::standard_left_secondary(true, NavButton::Left, MouseButton::Secondary, Command::PreviousTab)]
#[case::standard_right_primary(true, NavButton::Right, MouseButton::Primary, Command::HostForward)]
#[case::standard_right_secondary(true, NavButton::Right, MouseButton::Secondary, Command::NextTab)]
#[case::swapped_left_primary(false, NavButton::Left, MouseButton::Primary, Command::PreviousTab)]
#[case::swapped_left_secondary(false, NavButton::Left, MouseButton::Secondary, Command::HostBack)]
#[case::swapped_right_primary(false, NavButton::Right, MouseButton::Primary, Command::NextTab)]
#[case::swapped_right_secondary(false, NavButton::Right, MouseButton::Secondary, Command::HostForward)]
#[case::close_primary(true, NavButton::Close, MouseButton::Primary, Command::CloseCurrentTab)]
#[case::close_secondary(false, NavButton::Close, MouseButton::Secondary, Command::OpenNewTab)]
fn test_nav_buttons(
    #[case] standard_nav: bool,
    #[case] nav: NavButton,
    #[case] button: MouseButton,
    #[case] expected: Command,
) {
    assert_eq!(on_click(ClickTarget::Nav(nav), button, standard_nav), Some(expected));
}

#[test]
fn test_nav_ignores_middle_button() {
    assert_eq!(on_click(ClickTarget::Nav(NavButton::Close), MouseButton::Middle, true), None);
}

// ---------------------------------------------------------------------------
// Shortcuts
// ---------------------------------------------------------------------------

#[test]
fn test_default_shortcuts() {
    let mgr = ShortcutManager::new();
    assert_eq!(mgr.handle_key(&KeyEvent::ctrl("w"), true), Some(ShortcutAction::CloseCurrentTab));
    assert_eq!(mgr.handle_key(&KeyEvent::ctrl("PageUp"), true), Some(ShortcutAction::PreviousTab));
    assert_eq!(mgr.handle_key(&KeyEvent::ctrl("PageDown"), true), Some(ShortcutAction::NextTab));
    assert_eq!(mgr.handle_key(&KeyEvent::ctrl("PageDown"), false), None);
    assert_eq!(
        mgr.handle_key(
            &KeyEvent {
                key: "w".into(),
                ..KeyEvent::default()
            },
            true
        ),
        None
    );
}

#[test]
fn test_rebinding_detects_conflicts() {
    let mut mgr = ShortcutManager::new();

    let err = mgr.register_shortcut(ShortcutAction::NextTab, "Ctrl+W").unwrap_err();
    assert!(matches!(err, ShortcutError::Conflict(_)));

    mgr.register_shortcut(ShortcutAction::NextTab, "Alt+Right").unwrap();
    assert_eq!(mgr.get_shortcut(ShortcutAction::NextTab).unwrap().to_string(), "Alt+Right");
    // Rebinding an action to its own chord is not a conflict.
    mgr.register_shortcut(ShortcutAction::NextTab, "alt+Right").unwrap();

    assert!(matches!(
        mgr.register_shortcut(ShortcutAction::PreviousTab, "Hyper+Left"),
        Err(ShortcutError::InvalidKeys(_))
    ));
}

#[test]
fn test_unregister_and_reset() {
    let mut mgr = ShortcutManager::new();
    mgr.unregister_shortcut(ShortcutAction::CloseCurrentTab).unwrap();
    assert!(matches!(
        mgr.unregister_shortcut(ShortcutAction::CloseCurrentTab),
        Err(ShortcutError::NotFound(_))
    ));
    assert_eq!(mgr.handle_key(&KeyEvent::ctrl("w"), true), None);
    assert_eq!(mgr.list_shortcuts().len(), 2);

    mgr.reset_to_defaults();
    assert_eq!(mgr.list_shortcuts().len(), ShortcutAction::ALL.len());
    assert_eq!(
        mgr.has_conflict(&KeyChord::parse("Ctrl+W").unwrap(), None),
        Some(ShortcutAction::CloseCurrentTab)
    );
}

#[test]
fn test_shortcut_commands() {
    assert_eq!(on_shortcut(ShortcutAction::CloseCurrentTab), Command::CloseCurrentTab);
    assert_eq!(on_shortcut(ShortcutAction::PreviousTab), Command::PreviousTab);
    assert_eq!(on_shortcut(ShortcutAction::NextTab), Command::NextTab);
}

// ---------------------------------------------------------------------------
// Drag controller
// ---------------------------------------------------------------------------

#[test]
fn test_drag_starts_after_threshold() {
    let host = FakeHost::new();
    let mut drag = DragController::new(host.clone());

    assert!(drag.press(DragKind::Tab, 0, Point::new(10.0, 10.0)));
    assert_eq!(host.active_captures(), 1);

    assert_eq!(drag.pointer_move(DragKind::Tab, Point::new(30.0, 30.0)), None);
    assert!(!drag.is_dragging(DragKind::Tab));
    drag.hover(DragKind::Tab, 2);
    assert_eq!(drag.pointer_move(DragKind::Tab, Point::new(30.0, 30.0)), None);

    assert_eq!(drag.pointer_move(DragKind::Tab, Point::new(10.0, 31.0)), None);
    assert!(drag.is_dragging(DragKind::Tab));
}

#[test]
fn test_drag_emits_live_moves() {
    let host = FakeHost::new();
    let mut drag = DragController::new(host.clone());
    drag.press(DragKind::Favourite, 0, Point::new(0.0, 0.0));
    drag.pointer_move(DragKind::Favourite, Point::new(25.0, 0.0));

    drag.hover(DragKind::Favourite, 1);
    let step = drag.pointer_move(DragKind::Favourite, Point::new(50.0, 0.0)).unwrap();
    assert_eq!(
        step,
        DragMove {
            kind: DragKind::Favourite,
            from: 0,
            to: 1
        }
    );
    assert_eq!(step.command(), Command::MoveFavourite { from: 0, to: 1 });

    // Same hovered entry: the dragged one already sits there.
    assert_eq!(drag.pointer_move(DragKind::Favourite, Point::new(55.0, 0.0)), None);

    drag.hover(DragKind::Favourite, 3);
    let step = drag.pointer_move(DragKind::Favourite, Point::new(90.0, 0.0)).unwrap();
    assert_eq!((step.from, step.to), (1, 3));
}

#[test]
fn test_drag_sessions_release_capture() {
    let host = FakeHost::new();
    let mut drag = DragController::new(host.clone());

    assert!(drag.press(DragKind::Tab, 0, Point::new(0.0, 0.0)));
    assert!(!drag.press(DragKind::Tab, 1, Point::new(0.0, 0.0)));
    assert!(drag.press(DragKind::Group, 0, Point::new(0.0, 0.0)));
    assert_eq!(host.active_captures(), 2);

    drag.release(DragKind::Tab);
    assert_eq!(host.active_captures(), 1);
    assert!(!drag.is_active(DragKind::Tab));

    drag.cancel_all();
    assert_eq!(host.active_captures(), 0);
    assert_eq!(drag.pointer_move(DragKind::Group, Point::new(99.0, 0.0)), None);
}

#[test]
fn test_dropping_controller_releases_capture() {
    let host = FakeHost::new();
    {
        let mut drag = DragController::new(host.clone());
        drag.press(DragKind::Tab, 0, Point::new(0.0, 0.0));
        assert_eq!(host.active_captures(), 1);
    }
    assert_eq!(host.active_captures(), 0);
}

#[test]
fn test_drag_commands_per_kind() {
    let step = |kind| DragMove { kind, from: 1, to: 0 }.command();
    assert_eq!(step(DragKind::Tab), Command::MoveTab { from: 1, to: 0 });
    assert_eq!(step(DragKind::Group), Command::MoveFavouriteGroup { from: 1, to: 0 });
}

// ---------------------------------------------------------------------------
// Context menus
// ---------------------------------------------------------------------------

#[test]
fn test_tab_menu_close_entries_depend_on_position() {
    let host = scripted_host();
    let registry = registry(&host, 3);

    let first = tab_menu(&registry, 0);
    assert_eq!(
        first.labels(),
        vec!["Duplicate", "Add to favourites", "Minimize tab", "Move left", "Move right", "Close..."]
    );
    let close = first.submenu_entries("Close...").unwrap();
    assert_eq!(close.labels(), vec!["Close tab", "Close all other tabs", "Close all tabs to right"]);

    let last = tab_menu(&registry, 2);
    let close = last.submenu_entries("Close...").unwrap();
    assert_eq!(close.labels(), vec!["Close tab", "Close all other tabs", "Close all tabs to left"]);
    assert_eq!(last.choose("Close all tabs to left"), Some(Command::CloseTab(2, CloseMode::Left)));

    assert!(tab_menu(&registry, 3).is_empty());
}

#[test]
fn test_single_tab_menu_has_no_close_or_move() {
    let host = scripted_host();
    let registry = registry(&host, 1);

    let menu = tab_menu(&registry, 0);
    assert_eq!(menu.labels(), vec!["Duplicate", "Add to favourites", "Minimize tab"]);
    assert_eq!(menu.find("Minimize tab").unwrap().checked, Some(false));
}

#[test]
fn test_fav_menu_lists_groups() {
    let host = scripted_host();
    let mut registry = registry(&host, 1);
    registry.add_to_favourites("a", "", "/channels/1/11", Some("11"), None);

    let menu = fav_menu(&registry, 0);
    assert_eq!(
        menu.labels(),
        vec!["Open in new tab", "Rename", "Minimize favourite", "Move To...", "Delete"]
    );
    let targets = menu.submenu_entries("Move To...").unwrap();
    assert_eq!(targets.labels(), vec!["Favorites Bar", "No groups"]);
    assert!(!targets.find("No groups").unwrap().is_enabled());
    assert!(menu.find("Delete").unwrap().danger);

    let work = registry.add_favourite_group("Work").unwrap();
    registry.add_to_favourites("b", "", "/channels/@me/21", Some("21"), None);
    let menu = fav_menu(&registry, 1);
    assert!(menu.labels().contains(&"Move left"));
    let targets = menu.submenu_entries("Move To...").unwrap();
    assert_eq!(targets.labels(), vec!["Favorites Bar", "Work"]);
    assert_eq!(targets.choose("Work"), Some(Command::MoveToGroup { index: 1, group_id: work }));
    assert_eq!(
        targets.choose("Favorites Bar"),
        Some(Command::MoveToGroup {
            index: 1,
            group_id: UNGROUPED
        })
    );
}

#[test]
fn test_group_menu_moves_by_position() {
    let host = scripted_host();
    let mut registry = registry(&host, 1);
    let a = registry.add_favourite_group("A").unwrap();
    assert_eq!(group_menu(&registry, a).labels(), vec!["Open all", "Rename", "Delete"]);

    let b = registry.add_favourite_group("B").unwrap();
    let menu = group_menu(&registry, b);
    assert_eq!(menu.labels(), vec!["Open all", "Move left", "Move right", "Rename", "Delete"]);
    assert_eq!(menu.choose("Move left"), Some(Command::MoveFavouriteGroupLeft(1)));
    assert_eq!(menu.choose("Delete"), Some(Command::RemoveFavouriteGroup(b)));
    assert!(group_menu(&registry, 9).is_empty());
}

#[test]
fn test_fav_bar_menu() {
    let menu = fav_bar_menu();
    assert_eq!(
        menu.labels(),
        vec!["Add current tab as favourite", "Create a new group...", "Hide Favorites"]
    );
    assert_eq!(menu.choose("Hide Favorites"), Some(Command::HideFavBar));
}

#[rstest]
#[case::guild_channel("11", "Save channel as bookmark")]
#[case::dm("21", "Save DM as bookmark")]
#[case::group_dm("22", "Save bookmark")]
fn test_host_channel_menu_labels(#[case] channel_id: &str, #[case] fav_label: &str) {
    let host = scripted_host();
    let adapter = HostAdapter::resolve(host.capabilities()).unwrap();

    let menu = host_channel_menu(&adapter, &BarPreferences::default(), channel_id).unwrap();
    assert_eq!(menu.labels(), vec![HOST_SUBMENU_LABEL]);
    let items = menu.submenu_entries(HOST_SUBMENU_LABEL).unwrap();
    assert_eq!(items.labels(), vec!["Open in new tab", fav_label]);
}

#[test]
fn test_thread_bookmark_uses_parent_icon() {
    let host = scripted_host();
    let adapter = HostAdapter::resolve(host.capabilities()).unwrap();

    let menu = host_channel_menu(&adapter, &BarPreferences::default(), "41").unwrap();
    let Some(Command::SaveTargetAsFavourite(target)) = menu.choose("Save thread as bookmark") else {
        panic!("thread bookmark item missing");
    };
    assert_eq!(
        target,
        HostTarget {
            guild_id: Some("1".into()),
            channel_id: Some("41".into()),
            name: "#release-planning".into(),
            icon_url: "https://cdn.example/icons/1.png".into(),
        }
    );
    assert_eq!(target.url(), "/channels/1/41");
}

#[rstest]
#[case::default_icon("22", DEFAULT_ICON_GREEN)]
#[case::own_icon("23", "https://cdn.discordapp.com/channel-icons/23/abc.webp")]
fn test_group_dm_bookmark_carries_icon(#[case] channel_id: &str, #[case] icon_url: &str) {
    let host = scripted_host();
    host.add_group_dm("23", Some("Crew"), &["200"], Some("abc"));
    let adapter = HostAdapter::resolve(host.capabilities()).unwrap();

    let menu = host_channel_menu(&adapter, &BarPreferences::default(), channel_id).unwrap();
    let Some(Command::SaveTargetAsFavourite(target)) = menu.choose("Save bookmark") else {
        panic!("group DM bookmark item missing");
    };
    assert_eq!(target.icon_url, icon_url);
    assert_eq!(target.url(), format!("/channels/@me/{}", channel_id));
}

#[test]
fn test_host_menus_follow_bar_visibility() {
    let host = scripted_host();
    let adapter = HostAdapter::resolve(host.capabilities()).unwrap();
    let mut prefs = BarPreferences::default();

    prefs.show_fav_bar = false;
    let menu = host_channel_menu(&adapter, &prefs, "11").unwrap();
    assert_eq!(menu.submenu_entries(HOST_SUBMENU_LABEL).unwrap().labels(), vec!["Open in new tab"]);

    prefs.show_tab_bar = false;
    assert!(host_channel_menu(&adapter, &prefs, "11").is_none());
    assert!(host_channel_menu(&adapter, &BarPreferences::default(), "404").is_none());
}

#[test]
fn test_host_guild_menu() {
    let host = scripted_host();
    let adapter = HostAdapter::resolve(host.capabilities()).unwrap();
    let prefs = BarPreferences::default();

    let menu = host_guild_menu(&adapter, &prefs, "1").unwrap();
    let items = menu.submenu_entries(HOST_SUBMENU_LABEL).unwrap();
    assert_eq!(items.labels(), vec!["Save guild as bookmark"]);
    let Some(Command::SaveTargetAsFavourite(guild)) = items.choose("Save guild as bookmark") else {
        panic!("guild bookmark missing");
    };
    assert_eq!(guild.url(), "/channels/1");
    assert_eq!(guild.name, "Rustaceans");

    host.set_path("/channels/1/11");
    let menu = host_guild_menu(&adapter, &prefs, "1").unwrap();
    assert_eq!(
        menu.submenu_entries(HOST_SUBMENU_LABEL).unwrap().labels(),
        vec!["Open channel in new tab", "Save channel as bookmark", "Save guild as bookmark"]
    );
    assert!(host_guild_menu(&adapter, &prefs, "9").is_none());
}
