//! Integration tests for the application core: mount lifecycle, inbound
//! navigation before and after mount, command dispatch, prompts, badges and
//! drag reordering, all against the scripted `FakeHost`.

use std::rc::Rc;

use channeltabs::app::{App, AppDeps, MenuTarget};
use channeltabs::managers::command::Command;
use channeltabs::managers::context_menu::Prompt;
use channeltabs::managers::drag_controller::{DragKind, Point};
use channeltabs::managers::gestures::{ClickTarget, MouseButton, NavButton};
use channeltabs::managers::registry::CloseMode;
use channeltabs::managers::shortcut_manager::KeyEvent;
use channeltabs::services::badge_watcher::{entry_badges, has_unread_target};
use channeltabs::services::fake_host::FakeHost;
use channeltabs::services::kv_store::{KeyValueStore, MemoryStore};
use channeltabs::services::mount::MountOutcome;
use channeltabs::services::settings_engine::settings_key;
use channeltabs::types::errors::HostError;
use channeltabs::types::favourite::{Favourite, UNGROUPED};
use channeltabs::types::host::ChannelKind;
use channeltabs::types::settings::{BadgeScope, BarSettings};
use channeltabs::types::tab::Tab;

const ACCOUNT: &str = "100";

/// Answers every prompt with a fixed reply, or cancels.
struct FixedPrompt(Option<&'static str>);

impl Prompt for FixedPrompt {
    fn ask(&self, _title: &str, _initial: &str) -> Option<String> {
        self.0.map(str::to_string)
    }
}

fn scripted_host() -> Rc<FakeHost> {
    let host = FakeHost::new();
    host.set_current_user(ACCOUNT);
    host.add_user(ACCOUNT, "me", None);
    host.add_user("200", "alice", Some("Alice"));
    host.add_guild("1", "Rustaceans", None);
    host.add_guild_channel("1", "11", "general", ChannelKind::GuildText);
    host.add_guild_channel("1", "12", "help", ChannelKind::GuildText);
    host.add_dm("21", "200");
    host
}

fn build(host: &Rc<FakeHost>, store: &Rc<MemoryStore>, answer: Option<&'static str>) -> Rc<App> {
    let app = App::new(AppDeps {
        capabilities: host.capabilities(),
        pointer: host.clone(),
        prompt: Rc::new(FixedPrompt(answer)),
        store: store.clone(),
    })
    .unwrap();
    let listener = app.location_listener();
    host.set_on_navigate(move |path| listener(path));
    app
}

fn seed(store: &MemoryStore, settings: &BarSettings) {
    store.put_raw(&settings_key(Some(ACCOUNT)), &serde_json::to_string(settings).unwrap());
}

fn persisted(store: &MemoryStore) -> BarSettings {
    serde_json::from_value(store.load(&settings_key(Some(ACCOUNT))).unwrap().unwrap()).unwrap()
}

fn channel_tab(channel: &str, name: &str, selected: bool) -> Tab {
    Tab {
        url: format!("/channels/1/{}", channel),
        name: name.to_string(),
        icon_url: String::new(),
        channel_id: Some(channel.to_string()),
        selected,
        minimized: false,
    }
}

async fn mounted(host: &Rc<FakeHost>, store: &Rc<MemoryStore>) -> Rc<App> {
    let app = build(host, store, Some("Work"));
    app.gate().container_appeared();
    assert_eq!(app.mount().await, MountOutcome::Mounted);
    app
}

fn selected_url(app: &App) -> String {
    app.with_registry(|r| r.selected_tab().unwrap().url.clone()).unwrap()
}

// ---------------------------------------------------------------------------
// Startup and lifecycle
// ---------------------------------------------------------------------------

#[test]
fn test_new_requires_navigation() {
    let host = scripted_host();
    let mut caps = host.capabilities();
    caps.navigator = None;
    let result = App::new(AppDeps {
        capabilities: caps,
        pointer: host.clone(),
        prompt: Rc::new(FixedPrompt(None)),
        store: Rc::new(MemoryStore::new()),
    });
    assert!(matches!(result, Err(HostError::MissingCapability(_))));
}

#[test]
fn test_missing_features_notice() {
    let host = scripted_host();
    let mut caps = host.capabilities();
    caps.typing = None;
    let app = App::new(AppDeps {
        capabilities: caps,
        pointer: host.clone(),
        prompt: Rc::new(FixedPrompt(None)),
        store: Rc::new(MemoryStore::new()),
    })
    .unwrap();
    assert_eq!(app.notice(), Some("These features are unavailable: Typing Indicators"));
}

#[test]
fn test_settings_are_keyed_by_account() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let _app = build(&host, &store, None);
    assert!(store.read_raw("channeltabs_new_100").unwrap().is_some());
}

#[tokio::test]
async fn test_mount_attaches_and_teardown_detaches() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = build(&host, &store, None);
    assert!(!app.is_mounted());
    assert!(!app.dispatch(Command::OpenNewTab));

    app.gate().container_appeared();
    assert_eq!(app.mount().await, MountOutcome::Mounted);
    assert!(app.is_mounted());
    assert!(app.pending_settings().is_none());
    assert_eq!(host.listener_count(), 1);

    app.teardown();
    assert!(!app.is_mounted());
    assert_eq!(host.listener_count(), 0);
    assert!(!app.dispatch(Command::OpenNewTab));
}

#[tokio::test]
async fn test_mount_waits_for_container() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = build(&host, &store, None);

    let appear = async {
        tokio::task::yield_now().await;
        assert!(!app.is_mounted());
        app.gate().container_appeared();
    };
    let (outcome, ()) = tokio::join!(app.mount(), appear);

    assert_eq!(outcome, MountOutcome::Mounted);
    assert!(app.is_mounted());
}

#[tokio::test]
async fn test_teardown_cancels_pending_mount() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = build(&host, &store, None);

    let cancel = async {
        tokio::task::yield_now().await;
        app.teardown();
        app.gate().container_appeared();
    };
    let (outcome, ()) = tokio::join!(app.mount(), cancel);

    assert_eq!(outcome, MountOutcome::Cancelled);
    assert!(!app.is_mounted());
    assert_eq!(host.listener_count(), 0);
}

// ---------------------------------------------------------------------------
// Inbound navigation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_navigation_before_mount_updates_pending_tab() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = build(&host, &store, None);

    host.set_path("/channels/1/11");
    app.on_location_changed("/channels/1/11");

    let pending = app.pending_settings().unwrap();
    assert_eq!(pending.tabs.len(), 1);
    assert_eq!(pending.tabs[0].name, "#general");
    assert_eq!(persisted(&store).tabs[0].url, "/channels/1/11");

    app.gate().container_appeared();
    app.mount().await;
    assert_eq!(selected_url(&app), "/channels/1/11");
}

#[tokio::test]
async fn test_reopen_last_channel_navigates_on_mount() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let mut settings = BarSettings::default();
    settings.preferences.reopen_last_channel = true;
    settings.tabs = vec![channel_tab("11", "#general", false), channel_tab("12", "#help", true)];
    seed(&store, &settings);
    let app = build(&host, &store, None);

    // Ignored: the selected tab is reopened at mount anyway.
    host.set_path("/channels/@me/21");
    app.on_location_changed("/channels/@me/21");
    assert_eq!(app.pending_settings().unwrap().tabs[1].url, "/channels/1/12");

    app.gate().container_appeared();
    app.mount().await;

    assert_eq!(host.last_navigation().as_deref(), Some("/channels/1/12"));
    assert_eq!(selected_url(&app), "/channels/1/12");
}

#[tokio::test]
async fn test_own_navigation_does_not_rewrite_tabs() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let mut settings = BarSettings::default();
    settings.tabs = vec![channel_tab("11", "Custom name", true), channel_tab("12", "#help", false)];
    seed(&store, &settings);
    let app = mounted(&host, &store).await;

    assert!(app.dispatch(Command::SwitchToTab(1)));
    assert!(app.dispatch(Command::SwitchToTab(0)));

    assert_eq!(host.navigations().len(), 2);
    let first = app.with_registry(|r| r.tabs()[0].clone()).unwrap();
    assert_eq!(first.name, "Custom name");
}

#[tokio::test]
async fn test_external_navigation_moves_selected_tab() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = mounted(&host, &store).await;

    host.set_path("/channels/@me/21");
    app.on_location_changed("/channels/@me/21");

    let tab = app.with_registry(|r| r.selected_tab().cloned()).flatten().unwrap();
    assert_eq!(tab.url, "/channels/@me/21");
    assert_eq!(tab.name, "Alice");
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_visit_favourite_moves_selected_tab() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let mut settings = BarSettings::default();
    settings.favs.push(Favourite {
        name: "#help".into(),
        icon_url: String::new(),
        url: "/channels/1/12".into(),
        channel_id: Some("12".into()),
        guild_id: None,
        group_id: UNGROUPED,
        minimized: false,
    });
    seed(&store, &settings);
    let app = mounted(&host, &store).await;

    assert!(app.click(ClickTarget::Favourite(0), MouseButton::Primary));

    assert_eq!(host.last_navigation().as_deref(), Some("/channels/1/12"));
    assert_eq!(selected_url(&app), "/channels/1/12");
    assert_eq!(app.with_registry(|r| r.tabs().len()), Some(1));
}

#[tokio::test]
async fn test_close_selected_tab_navigates_to_neighbour() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let mut settings = BarSettings::default();
    settings.tabs = vec![
        channel_tab("11", "#general", false),
        channel_tab("12", "#help", true),
        Tab::friends(),
    ];
    seed(&store, &settings);
    let app = mounted(&host, &store).await;

    assert!(app.dispatch(Command::CloseTab(1, CloseMode::Single)));

    assert_eq!(host.last_navigation().as_deref(), Some("/channels/1/11"));
    assert_eq!(selected_url(&app), "/channels/1/11");
    assert_eq!(persisted(&store).tabs.len(), 2);
}

#[tokio::test]
async fn test_new_group_is_named_by_prompt() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = mounted(&host, &store).await;

    let menu = app.menu(&MenuTarget::FavBar).unwrap();
    assert!(app.dispatch(menu.choose("Create a new group...").unwrap()));

    let names: Vec<String> = app
        .with_registry(|r| r.groups().iter().map(|g| g.name.clone()).collect())
        .unwrap();
    assert_eq!(names, vec!["Work".to_string()]);
}

#[tokio::test]
async fn test_cancelled_prompt_keeps_names() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = build(&host, &store, None);
    app.gate().container_appeared();
    app.mount().await;

    assert!(app.dispatch(Command::AddFavouriteGroup));
    assert!(app.dispatch(Command::AddCurrentToFavourites));
    assert!(!app.dispatch(Command::RenameFavourite(0)));
    assert!(!app.dispatch(Command::RenameFavouriteGroup(0)));

    app.with_registry(|r| {
        assert_eq!(r.groups()[0].name, "New Group");
        assert_eq!(r.favs()[0].name, "Friends");
    });
}

#[tokio::test]
async fn test_group_dropdown_toggles() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = mounted(&host, &store).await;
    app.dispatch(Command::AddFavouriteGroup);

    assert!(app.click(ClickTarget::Group(0), MouseButton::Primary));
    assert_eq!(app.open_group(), Some(0));
    assert!(app.click(ClickTarget::Group(0), MouseButton::Primary));
    assert_eq!(app.open_group(), None);

    app.click(ClickTarget::Group(0), MouseButton::Primary);
    assert!(app.click(ClickTarget::Elsewhere, MouseButton::Primary));
    assert_eq!(app.open_group(), None);
    assert!(!app.dispatch(Command::ToggleGroupDropdown(7)));

    app.dispatch(Command::ToggleGroupDropdown(0));
    app.dispatch(Command::RemoveFavouriteGroup(0));
    assert_eq!(app.open_group(), None);
}

#[tokio::test]
async fn test_nav_buttons_reach_host_history() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = mounted(&host, &store).await;

    app.click(ClickTarget::Nav(NavButton::Left), MouseButton::Primary);
    app.click(ClickTarget::Nav(NavButton::Right), MouseButton::Primary);
    assert_eq!((host.back_count(), host.forward_count()), (1, 1));

    app.dispatch(Command::ToggleStandardNav);
    app.click(ClickTarget::Nav(NavButton::Left), MouseButton::Secondary);
    assert_eq!(host.back_count(), 2);
}

#[tokio::test]
async fn test_shortcuts_need_window_focus() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = mounted(&host, &store).await;
    app.dispatch(Command::OpenNewTab);
    assert_eq!(app.with_registry(|r| r.selected_index()), Some(1));

    app.set_window_focused(false);
    assert!(!app.handle_key(&KeyEvent::ctrl("PageUp")));
    app.set_window_focused(true);
    assert!(app.handle_key(&KeyEvent::ctrl("PageUp")));
    assert_eq!(app.with_registry(|r| r.selected_index()), Some(0));
    assert!(app.handle_key(&KeyEvent::ctrl("w")));
    assert_eq!(app.with_registry(|r| r.tabs().len()), Some(1));
}

#[tokio::test]
async fn test_guild_bookmark_from_host_menu() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = mounted(&host, &store).await;

    let menu = app.menu(&MenuTarget::HostGuild("1".into())).unwrap();
    assert!(app.dispatch(menu.choose("Save guild as bookmark").unwrap()));

    let fav = app.with_registry(|r| r.favs()[0].clone()).unwrap();
    assert_eq!(fav.url, "/channels/1");
    assert_eq!(fav.guild_id.as_deref(), Some("1"));
    assert_eq!(fav.channel_id, None);

    host.set_path("/channels/1/12");
    app.on_location_changed("/channels/1/12");
    app.dispatch(Command::OpenFavInNewTab(0));
    let opened = app.with_registry(|r| r.tabs().last().cloned()).flatten().unwrap();
    assert_eq!(opened.url, "/channels/1/12");
}

#[tokio::test]
async fn test_menus_hidden_before_mount() {
    let host = scripted_host();
    let app = build(&host, &Rc::new(MemoryStore::new()), None);
    assert!(app.menu(&MenuTarget::FavBar).is_none());
    assert!(app.menu(&MenuTarget::Tab(5)).is_none());
}

// ---------------------------------------------------------------------------
// Badges and drag
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_store_changes_refresh_badges() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let mut settings = BarSettings::default();
    settings.tabs = vec![channel_tab("11", "#general", true), channel_tab("12", "#help", false)];
    seed(&store, &settings);
    let app = mounted(&host, &store).await;
    assert_eq!(app.badges().tabs[1].unread_count, 0);

    host.set_unread("12", 6, 1, false, true);
    host.notify_change();

    let badges = app.badges();
    assert_eq!(badges.tabs[1].unread_count, 6);
    assert_eq!(badges.tabs[1].mention_count, 1);

    app.teardown();
    host.set_unread("12", 9, 0, false, true);
    host.notify_change();
    assert_eq!(app.badges().tabs[1].unread_count, 6);
}

#[tokio::test]
async fn test_newer_settings_survive_the_session() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let key = settings_key(Some(ACCOUNT));
    let newer = serde_json::json!({
        "schemaVersion": 2,
        "tabs": [],
        "favs": [{ "name": "keep", "url": "/channels/1/11", "channelId": "11", "groupId": -1 }],
        "favGroups": []
    })
    .to_string();
    store.put_raw(&key, &newer);

    let app = mounted(&host, &store).await;
    host.set_path("/channels/1/12");
    app.on_location_changed("/channels/1/12");
    assert!(app.dispatch(Command::OpenNewTab));
    app.teardown();

    assert_eq!(app.with_registry(|r| r.tabs().len()), None);
    assert_eq!(store.read_raw(&key).unwrap().as_deref(), Some(newer.as_str()));
    assert_eq!(store.structured_writes() + store.raw_writes(), 0);
}

#[tokio::test]
async fn test_unselected_duplicate_keeps_plain_tab_badges() {
    let host = scripted_host();
    host.set_path("/channels/1/11");
    let store = Rc::new(MemoryStore::new());
    let mut settings = BarSettings::default();
    settings.tabs = vec![channel_tab("11", "#general", true)];
    seed(&store, &settings);
    let app = mounted(&host, &store).await;

    assert!(app.dispatch(Command::DuplicateTab(0)));
    host.set_unread("11", 4, 2, false, true);
    host.notify_change();

    let badges = app.badges();
    assert!(badges.tabs[0].selected);
    assert!(!badges.tabs[1].selected);
    let prefs = app.with_registry(|r| r.preferences().clone()).unwrap();
    let shown = entry_badges(&prefs, BadgeScope::Tab, &badges.tabs[1], has_unread_target(app.host(), Some("11")));
    assert_eq!(shown.unread.as_deref(), Some("4"));
    assert_eq!(shown.mention, Some(2));
    let active = entry_badges(&prefs, BadgeScope::Tab, &badges.tabs[0], true);
    assert_eq!(active.unread, None);
}

#[tokio::test]
async fn test_drag_reorders_tabs() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let mut settings = BarSettings::default();
    settings.tabs = vec![
        channel_tab("11", "a", true),
        channel_tab("12", "b", false),
        Tab::friends(),
    ];
    seed(&store, &settings);
    let app = mounted(&host, &store).await;

    assert!(app.drag_press(DragKind::Tab, 0, Point::new(0.0, 0.0)));
    assert!(!app.drag_move(DragKind::Tab, Point::new(25.0, 0.0)));
    assert!(app.is_dragging(DragKind::Tab));
    app.drag_hover(DragKind::Tab, 2);
    assert!(app.drag_move(DragKind::Tab, Point::new(80.0, 0.0)));
    app.drag_release(DragKind::Tab);

    let names: Vec<String> = app
        .with_registry(|r| r.tabs().iter().map(|t| t.name.clone()).collect())
        .unwrap();
    assert_eq!(names, vec!["b", "Friends", "a"]);
    assert_eq!(app.with_registry(|r| r.selected_index()), Some(2));
    assert_eq!(host.active_captures(), 0);
}

#[tokio::test]
async fn test_teardown_releases_active_drag() {
    let host = scripted_host();
    let store = Rc::new(MemoryStore::new());
    let app = mounted(&host, &store).await;

    app.drag_press(DragKind::Favourite, 0, Point::new(0.0, 0.0));
    assert_eq!(host.active_captures(), 1);
    app.teardown();
    assert_eq!(host.active_captures(), 0);
}
