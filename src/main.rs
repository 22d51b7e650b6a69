//! ChannelTabs: browser-style tabs and favourites for a chat client.
//!
//! Console demo: drives the core against the in-process fake host, the way
//! a host integration would, and prints what the bars would show.

use std::error::Error;
use std::rc::Rc;

use channeltabs::app::{default_store, App, AppDeps, MenuTarget};
use channeltabs::managers::command::Command;
use channeltabs::managers::context_menu::Prompt;
use channeltabs::managers::drag_controller::{DragKind, Point};
use channeltabs::managers::gestures::{ClickTarget, MouseButton, NavButton};
use channeltabs::managers::registry::CloseMode;
use channeltabs::managers::shortcut_manager::KeyEvent;
use channeltabs::services::badge_watcher::{entry_badges, has_unread_target};
use channeltabs::services::derived_state::typing_tooltip_text;
use channeltabs::services::fake_host::FakeHost;
use channeltabs::services::host_adapter::Selection;
use channeltabs::services::kv_store::{KeyValueStore, SqliteStore};
use channeltabs::services::mount::MountOutcome;
use channeltabs::types::host::{ChannelKind, PresenceStatus};
use channeltabs::types::settings::BadgeScope;

struct ScriptedPrompt;

impl Prompt for ScriptedPrompt {
    fn ask(&self, title: &str, initial: &str) -> Option<String> {
        let answer = match title {
            "Rename group" => "Work".to_string(),
            _ => initial.to_string(),
        };
        println!("  ? {} [{}] -> {}", title, initial, answer);
        Some(answer)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    channeltabs::logging::init_tracing();

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║              ChannelTabs v{} — Demo Mode                 ║", env!("CARGO_PKG_VERSION"));
    println!("║     Tabs, favourites and groups for your channels          ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let host = scripted_host();
    // `--store json|sqlite` persists between runs; the default keeps everything in memory.
    let store: Rc<dyn KeyValueStore> = match std::env::args().skip_while(|a| a != "--store").nth(1).as_deref() {
        Some("json") => default_store(),
        Some("sqlite") => Rc::new(SqliteStore::open_default()?),
        _ => Rc::new(SqliteStore::open_in_memory()?),
    };
    let app = App::new(AppDeps {
        capabilities: host.capabilities(),
        pointer: host.clone(),
        prompt: Rc::new(ScriptedPrompt),
        store,
    })?;
    let listener = app.location_listener();
    host.set_on_navigate(move |path| listener(path));

    demo_mount(&app, &host)?;
    demo_tabs(&app, &host);
    demo_favourites(&app, &host);
    demo_badges(&app, &host);
    demo_gestures(&app, &host);
    demo_menus(&app);

    app.teardown();

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("  ✅ Demo finished; {} host listeners left attached.", host.listener_count());
    println!("═══════════════════════════════════════════════════════════════");
    Ok(())
}

fn section(name: &str) {
    println!("───────────────────────────────────────────────────────────────");
    println!("  📦 {}", name);
    println!("───────────────────────────────────────────────────────────────");
}

fn scripted_host() -> Rc<FakeHost> {
    let host = FakeHost::new();
    host.set_current_user("100");
    host.add_user("100", "me", Some("Me"));
    host.add_user("200", "alice", Some("Alice"));
    host.add_user("300", "bob", None);
    host.add_guild("1", "Rustaceans", Some("https://cdn.example/icons/1.png"));
    host.add_guild_channel("1", "11", "general", ChannelKind::GuildText);
    host.add_guild_channel("1", "12", "help", ChannelKind::GuildText);
    host.add_guild_channel("1", "13", "Lounge", ChannelKind::GuildVoice);
    host.add_dm("21", "200");
    host.set_status("200", PresenceStatus::Online);
    host
}

fn print_tabs(app: &App) {
    app.with_registry(|registry| {
        for (i, tab) in registry.tabs().iter().enumerate() {
            let mark = if tab.selected { "▶" } else { " " };
            println!("  {} [{}] {:<16} {}", mark, i, tab.name, tab.url);
        }
    });
}

fn demo_mount(app: &Rc<App>, host: &Rc<FakeHost>) -> Result<(), Box<dyn Error>> {
    section("Mount");
    let runtime = tokio::runtime::Builder::new_current_thread().build()?;

    // The user moves before the bars exist; the default tab follows.
    host.set_path("/channels/1/11");
    app.on_location_changed("/channels/1/11");

    app.gate().container_appeared();
    let outcome = runtime.block_on(app.mount());
    println!("  Mount outcome: {:?}", outcome);
    if outcome != MountOutcome::Mounted {
        return Err("bars did not mount".into());
    }
    if let Some(notice) = app.notice() {
        println!("  Notice: {}", notice);
    }
    print_tabs(app);
    println!("  ✓ Mounted with {} host listener(s)", host.listener_count());
    println!();
    Ok(())
}

fn demo_tabs(app: &Rc<App>, host: &Rc<FakeHost>) {
    use channeltabs::managers::command::HostTarget;
    section("Tabs");

    app.dispatch(Command::OpenTargetInNewTab(HostTarget {
        guild_id: Some("1".into()),
        channel_id: Some("12".into()),
        name: "#help".into(),
        icon_url: String::new(),
    }));
    app.dispatch(Command::OpenNewTab);
    app.dispatch(Command::DuplicateTab(0));
    print_tabs(app);

    app.dispatch(Command::SwitchToTab(1));
    println!("  Switched; host now at {}", host.current_path());
    app.dispatch(Command::CloseTab(1, CloseMode::Single));
    println!("  Closed tab 1; host now at {}", host.current_path());
    app.dispatch(Command::MoveTabLeft(0));
    print_tabs(app);

    // The user navigates through the host's own UI.
    host.set_path("/channels/@me/21");
    app.on_location_changed("/channels/@me/21");
    println!("  After external navigation:");
    print_tabs(app);
    println!("  ✓ Tab operations OK");
    println!();
}

fn demo_favourites(app: &Rc<App>, host: &Rc<FakeHost>) {
    section("Favourites & Groups");

    if let Some(menu) = app.menu(&MenuTarget::HostGuild("1".into())) {
        if let Some(command) = menu.choose("Save guild as bookmark") {
            app.dispatch(command);
        }
    }
    app.dispatch(Command::AddCurrentToFavourites);
    app.dispatch(Command::AddFavouriteGroup);
    app.dispatch(Command::MoveToGroup { index: 1, group_id: 0 });

    app.with_registry(|registry| {
        for (i, fav) in registry.favs().iter().enumerate() {
            println!("  [{}] {:<12} {:<18} group {}", i, fav.name, fav.url, fav.group_id);
        }
        for group in registry.groups() {
            println!("  Group {} \"{}\"", group.group_id, group.name);
        }
    });

    app.dispatch(Command::VisitFavourite(0));
    println!("  Visited guild favourite; host now at {}", host.current_path());
    app.dispatch(Command::RemoveFavouriteGroup(0));
    println!("  Removed group; all favourites back on the bar");
    println!("  ✓ Favourites OK");
    println!();
}

fn demo_badges(app: &Rc<App>, host: &Rc<FakeHost>) {
    section("Badges");
    host.set_unread("11", 0, 2, false, true);
    host.set_unread("12", 7, 0, true, true);
    host.set_typing("21", &["200"]);
    host.notify_change();

    let snapshot = app.badges();
    app.with_registry(|registry| {
        for (tab, state) in registry.tabs().iter().zip(&snapshot.tabs) {
            let unread_target = has_unread_target(registry.host(), tab.channel_id.as_deref());
            let display = entry_badges(registry.preferences(), BadgeScope::Tab, state, unread_target);
            println!(
                "  {:<16} unread {:<5} mentions {:<5} typing {}",
                tab.name,
                display.unread.unwrap_or_else(|| "-".into()),
                display.mention.map_or("-".to_string(), |m| m.to_string()),
                display.typing
            );
        }
        let typers: Vec<String> = vec!["200".into()];
        println!("  Tooltip: {}", typing_tooltip_text(registry.host(), Some(typers.as_slice())));
    });
    println!("  ✓ Badges OK");
    println!();
}

fn demo_gestures(app: &Rc<App>, host: &Rc<FakeHost>) {
    section("Gestures & Shortcuts");

    app.click(ClickTarget::Tab { index: 0, selected: false }, MouseButton::Primary);
    app.click(ClickTarget::Nav(NavButton::Left), MouseButton::Primary);
    println!("  Nav left (standard nav): {} host back request(s)", host.back_count());

    app.handle_key(&KeyEvent::ctrl("PageDown"));
    println!("  Ctrl+PageDown -> host at {}", host.current_path());

    app.drag_press(DragKind::Tab, 0, Point::new(0.0, 0.0));
    app.drag_move(DragKind::Tab, Point::new(30.0, 0.0));
    app.drag_hover(DragKind::Tab, 1);
    app.drag_move(DragKind::Tab, Point::new(60.0, 0.0));
    app.drag_release(DragKind::Tab);
    println!("  Dragged tab 0 onto 1; {} capture(s) still held", host.active_captures());
    print_tabs(app);
    println!("  ✓ Gestures OK");
    println!();
}

fn demo_menus(app: &Rc<App>) {
    section("Context Menus");
    for target in [MenuTarget::Tab(0), MenuTarget::FavBar] {
        if let Some(menu) = app.menu(&target) {
            println!("  {:?}:", target);
            for line in menu.to_string().lines() {
                println!("    {}", line);
            }
        }
    }
    println!("  ✓ Menus OK");
    println!();
}
