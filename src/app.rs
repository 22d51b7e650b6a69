//! App Core for ChannelTabs.
//!
//! Central struct wiring the host binding, settings engine, registry,
//! navigation bridge, badge watcher, shortcuts, drag controller and menus.
//! Every collaborator is handed in or built here; nothing reaches for a
//! global "current bar" pointer.
//!
//! Lifecycle: [`App::new`] binds the host and loads settings. Until the host
//! container appears the settings stay pending and inbound navigation only
//! updates their selected tab. [`App::mount`] waits for the container, then
//! builds the [`Registry`] and subscribes to store changes. [`App::teardown`]
//! cancels a pending mount and drops every subscription.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::{debug, error, info, warn};

use crate::managers::command::{Command, HostTarget};
use crate::managers::context_menu::{self, Menu, Prompt};
use crate::managers::drag_controller::{DragController, DragKind, Point, PointerCapture};
use crate::managers::favourites::{FavouritesTrait, DEFAULT_GROUP_NAME};
use crate::managers::gestures::{self, ClickTarget, MouseButton};
use crate::managers::registry::{current_location, tab_from_location, Registry, RegistryTrait};
use crate::managers::shortcut_manager::{KeyEvent, ShortcutManager, ShortcutManagerTrait};
use crate::services::badge_watcher::{BadgeSnapshot, StoreWatcher};
use crate::services::host_adapter::{HostAdapter, HostCapabilities};
use crate::services::kv_store::{JsonFileStore, KeyValueStore};
use crate::services::location_resolver::{self, ResolvedLocation};
use crate::services::mount::{MountGate, MountOutcome};
use crate::services::navigation_bridge::{Inbound, NavigationBridge};
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::HostError;
use crate::types::settings::BarSettings;

/// Everything the host hands over at startup.
pub struct AppDeps {
    pub capabilities: HostCapabilities,
    pub pointer: Rc<dyn PointerCapture>,
    pub prompt: Rc<dyn Prompt>,
    pub store: Rc<dyn KeyValueStore>,
}

/// Which menu to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuTarget {
    Tab(usize),
    Favourite(usize),
    Group(i32),
    FavBar,
    /// The host's own menu for a channel, thread, DM or group DM.
    HostChannel(String),
    /// The host's own menu for a guild.
    HostGuild(String),
}

/// Host navigation requested by a command and issued once the registry is released.
enum Outbound {
    Visit(String),
    Back,
    Forward,
}

pub struct App {
    host: Rc<HostAdapter>,
    bridge: NavigationBridge,
    engine: Rc<dyn SettingsEngineTrait>,
    prompt: Rc<dyn Prompt>,
    gate: MountGate,
    pending: RefCell<Option<BarSettings>>,
    registry: RefCell<Option<Registry>>,
    badges: RefCell<BadgeSnapshot>,
    watcher: RefCell<Option<StoreWatcher>>,
    shortcuts: RefCell<ShortcutManager>,
    drag: RefCell<DragController>,
    window_focused: Cell<bool>,
    open_group: Cell<Option<i32>>,
    notice: Option<String>,
}

/// JSON file store in the platform config directory.
pub fn default_store() -> Rc<dyn KeyValueStore> {
    Rc::new(JsonFileStore::new(crate::platform::get_config_dir()))
}

impl App {
    /// Binds the host and loads settings.
    ///
    /// Fails only when a fatal host capability is missing. Settings that
    /// cannot be loaded are logged and replaced by defaults.
    pub fn new(deps: AppDeps) -> Result<Rc<Self>, HostError> {
        let host = Rc::new(HostAdapter::resolve(deps.capabilities)?);
        let notice = host.missing_features().notice();
        if let Some(text) = &notice {
            warn!(notice = %text, "some features are unavailable");
        }

        let account_id = host.directory().current_user_id();
        let engine: Rc<dyn SettingsEngineTrait> =
            Rc::new(SettingsEngine::new(deps.store, account_id.as_deref()));
        let settings = engine.load().unwrap_or_else(|e| {
            error!(error = %e, "failed to load settings, starting from defaults");
            BarSettings::default()
        });
        info!(key = engine.key(), tabs = settings.tabs.len(), favs = settings.favs.len(), "settings ready");

        let bridge = NavigationBridge::new(host.navigator());
        Ok(Rc::new(Self {
            host,
            bridge,
            engine,
            prompt: deps.prompt,
            gate: MountGate::new(),
            pending: RefCell::new(Some(settings)),
            registry: RefCell::new(None),
            badges: RefCell::new(BadgeSnapshot::default()),
            watcher: RefCell::new(None),
            shortcuts: RefCell::new(ShortcutManager::new()),
            drag: RefCell::new(DragController::new(deps.pointer)),
            window_focused: Cell::new(true),
            open_group: Cell::new(None),
            notice,
        }))
    }

    pub fn host(&self) -> &HostAdapter {
        &self.host
    }

    pub fn bridge(&self) -> &NavigationBridge {
        &self.bridge
    }

    /// Fed by the host's container observer.
    pub fn gate(&self) -> &MountGate {
        &self.gate
    }

    /// The aggregated "features unavailable" notice, shown once.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.registry.borrow().is_some()
    }

    /// Settings still waiting for the mount.
    pub fn pending_settings(&self) -> Option<BarSettings> {
        self.pending.borrow().clone()
    }

    /// Runs `f` against the mounted registry.
    pub fn with_registry<R>(&self, f: impl FnOnce(&Registry) -> R) -> Option<R> {
        self.registry.borrow().as_ref().map(f)
    }

    pub fn badges(&self) -> BadgeSnapshot {
        self.badges.borrow().clone()
    }

    pub fn open_group(&self) -> Option<i32> {
        self.open_group.get()
    }

    pub fn set_window_focused(&self, focused: bool) {
        self.window_focused.set(focused);
    }

    pub fn shortcuts(&self) -> std::cell::RefMut<'_, ShortcutManager> {
        self.shortcuts.borrow_mut()
    }

    // --- lifecycle ---

    /// Waits for the host container, then attaches. Nothing happens if
    /// teardown comes first.
    pub async fn mount(self: &Rc<Self>) -> MountOutcome {
        let outcome = self.gate.waiter().wait().await;
        match outcome {
            MountOutcome::Mounted => self.attach(),
            MountOutcome::Cancelled => info!("mount cancelled before the container appeared"),
        }
        outcome
    }

    fn attach(self: &Rc<Self>) {
        let Some(settings) = self.pending.borrow_mut().take() else {
            return;
        };
        let reopen = settings.preferences.reopen_last_channel;
        let mut registry = Registry::new(
            settings,
            Rc::clone(&self.host),
            self.bridge.clone(),
            Rc::clone(&self.engine),
        );
        registry.refresh_icons();
        let reopen_url = reopen
            .then(|| registry.selected_tab().map(|t| t.url.clone()))
            .flatten();
        *self.registry.borrow_mut() = Some(registry);
        info!("bars mounted");

        let weak = Rc::downgrade(self);
        let listener: Rc<dyn Fn()> = Rc::new(move || {
            if let Some(app) = weak.upgrade() {
                app.refresh_badges();
            }
        });
        *self.watcher.borrow_mut() = Some(StoreWatcher::attach(self.host.subscriptions(), listener));
        self.refresh_badges();

        if let Some(url) = reopen_url {
            debug!(url, "reopening last channel");
            self.bridge.navigate(&url);
        }
    }

    /// Cancels a pending mount and drops subscriptions, drags and the registry.
    pub fn teardown(&self) {
        self.gate.teardown();
        self.watcher.borrow_mut().take();
        self.drag.borrow_mut().cancel_all();
        self.registry.borrow_mut().take();
        self.open_group.set(None);
    }

    /// A callback for the host's "location changed" event.
    pub fn location_listener(self: &Rc<Self>) -> impl Fn(&str) + 'static {
        let weak: Weak<Self> = Rc::downgrade(self);
        move |path: &str| {
            if let Some(app) = weak.upgrade() {
                app.on_location_changed(path);
            }
        }
    }

    /// Inbound navigation from the host.
    pub fn on_location_changed(&self, path: &str) {
        // Checked before borrowing: our own navigations fire this synchronously
        // while the registry is borrowed.
        if self.bridge.is_switching() {
            debug!(path, "ignoring self-triggered location change");
            return;
        }
        let Inbound::Refresh(location) = self.bridge.on_location_changed(&self.host, path) else {
            return;
        };
        let applied = match self.registry.borrow_mut().as_mut() {
            Some(registry) => registry.apply_location(location),
            None => {
                self.apply_to_pending(location);
                false
            }
        };
        if applied {
            self.refresh_badges();
        }
    }

    /// Before mount the location is written into the persisted selected tab,
    /// unless the last channel is reopened at startup anyway.
    fn apply_to_pending(&self, location: ResolvedLocation) {
        let mut pending = self.pending.borrow_mut();
        let Some(settings) = pending.as_mut() else {
            return;
        };
        if settings.preferences.reopen_last_channel {
            return;
        }
        debug!(url = %location.url, "updating pending default tab");
        let index = settings.tabs.iter().position(|t| t.selected).unwrap_or(0);
        match settings.tabs.get_mut(index) {
            Some(tab) => {
                let minimized = tab.minimized;
                *tab = tab_from_location(location, true);
                tab.minimized = minimized;
            }
            None => settings.tabs.push(tab_from_location(location, true)),
        }
        self.engine.save(settings);
    }

    /// Recomputes every badge from the host stores and swaps the snapshot in.
    pub fn refresh_badges(&self) {
        let Ok(registry) = self.registry.try_borrow() else {
            return;
        };
        if let Some(registry) = registry.as_ref() {
            let snapshot = BadgeSnapshot::compute(&self.host, &registry.snapshot());
            *self.badges.borrow_mut() = snapshot;
        }
    }

    // --- input ---

    /// Runs a command against the registry. `false` if it was a no-op or the
    /// bars are not mounted.
    pub fn dispatch(&self, command: Command) -> bool {
        debug!(?command, "dispatching");
        let mut outbound = None;
        let applied = {
            let mut slot = self.registry.borrow_mut();
            let Some(registry) = slot.as_mut() else {
                return false;
            };
            self.apply(registry, command, &mut outbound)
        };
        // Outside the borrow: the host may report these navigations back
        // synchronously, and the selected tab follows them.
        match outbound {
            Some(Outbound::Visit(url)) => self.bridge.visit(&url),
            Some(Outbound::Back) => self.bridge.back(),
            Some(Outbound::Forward) => self.bridge.forward(),
            None => {}
        }
        if applied {
            self.refresh_badges();
        }
        applied
    }

    fn apply(&self, registry: &mut Registry, command: Command, outbound: &mut Option<Outbound>) -> bool {
        match command {
            Command::SwitchToTab(index) => registry.switch_to_tab(index),
            Command::CloseTab(index, mode) => registry.close_tab(index, mode),
            Command::CloseCurrentTab => registry.close_current_tab(),
            Command::NextTab => registry.next_tab(),
            Command::PreviousTab => registry.previous_tab(),
            Command::OpenNewTab => registry.open_new_tab(),
            Command::DuplicateTab(index) => registry.duplicate_tab(index),
            Command::MinimizeTab(index) => registry.minimize_tab(index),
            Command::MoveTab { from, to } => registry.move_tab(from, to),
            Command::MoveTabLeft(index) => registry.move_tab_left(index),
            Command::MoveTabRight(index) => registry.move_tab_right(index),
            Command::AddTabToFavourites(index) => {
                let Some(tab) = registry.tabs().get(index).cloned() else {
                    return false;
                };
                registry.add_to_favourites(&tab.name, &tab.icon_url, &tab.url, tab.channel_id.as_deref(), None)
            }

            Command::VisitFavourite(index) => {
                *outbound = registry.favourite_target_url(index).map(Outbound::Visit);
                outbound.is_some()
            }
            Command::OpenFavInNewTab(index) => registry.open_fav_in_new_tab(index),
            Command::RenameFavourite(index) => {
                let Some(current) = registry.favs().get(index).map(|f| f.name.clone()) else {
                    return false;
                };
                match self.prompt.ask("Rename favourite", &current) {
                    Some(name) => registry.rename_favourite(index, &name),
                    None => false,
                }
            }
            Command::DeleteFavourite(index) => registry.delete_favourite(index),
            Command::MinimizeFavourite(index) => registry.minimize_favourite(index),
            Command::MoveFavourite { from, to } => registry.move_favourite(from, to),
            Command::MoveFavouriteLeft(index) => registry.move_favourite_left(index),
            Command::MoveFavouriteRight(index) => registry.move_favourite_right(index),
            Command::MoveToGroup { index, group_id } => registry.move_to_group(index, group_id),
            Command::AddCurrentToFavourites => {
                let here = current_location(registry.host());
                registry.add_to_favourites(&here.name, &here.icon_url, &here.url, here.channel_id.as_deref(), None)
            }

            Command::AddFavouriteGroup => {
                let Some(group_id) = registry.add_favourite_group(DEFAULT_GROUP_NAME) else {
                    return false;
                };
                if let Some(name) = self.prompt.ask("Rename group", DEFAULT_GROUP_NAME) {
                    registry.rename_favourite_group(group_id, &name);
                }
                true
            }
            Command::RenameFavouriteGroup(group_id) => {
                let current = registry
                    .groups()
                    .iter()
                    .find(|g| g.group_id == group_id)
                    .map(|g| g.name.clone());
                let Some(current) = current else {
                    return false;
                };
                match self.prompt.ask("Rename group", &current) {
                    Some(name) => registry.rename_favourite_group(group_id, &name),
                    None => false,
                }
            }
            Command::RemoveFavouriteGroup(group_id) => {
                if self.open_group.get() == Some(group_id) {
                    self.open_group.set(None);
                }
                registry.remove_favourite_group(group_id)
            }
            Command::MoveFavouriteGroup { from, to } => registry.move_favourite_group(from, to),
            Command::MoveFavouriteGroupLeft(index) => registry.move_favourite_group_left(index),
            Command::MoveFavouriteGroupRight(index) => registry.move_favourite_group_right(index),
            Command::OpenGroupInNewTabs(group_id) => registry.open_fav_group_in_new_tabs(group_id) > 0,
            Command::ToggleGroupDropdown(group_id) => {
                if !registry.group_exists(group_id) {
                    return false;
                }
                let next = if self.open_group.get() == Some(group_id) {
                    None
                } else {
                    Some(group_id)
                };
                self.open_group.set(next);
                true
            }
            Command::CloseDropdowns => self.open_group.take().is_some(),

            Command::OpenTargetInNewTab(target) => open_target(registry, target),
            Command::SaveTargetAsFavourite(target) => {
                let url = target.url();
                let guild_id = match target.channel_id {
                    Some(_) => None,
                    None => target.guild_id.as_deref(),
                };
                registry.add_to_favourites(&target.name, &target.icon_url, &url, target.channel_id.as_deref(), guild_id)
            }

            Command::HostBack => {
                *outbound = Some(Outbound::Back);
                true
            }
            Command::HostForward => {
                *outbound = Some(Outbound::Forward);
                true
            }

            Command::ToggleTabBar => {
                registry.toggle_tab_bar();
                true
            }
            Command::ToggleFavBar => {
                registry.toggle_fav_bar();
                true
            }
            Command::HideFavBar => {
                registry.hide_fav_bar();
                true
            }
            Command::ToggleBadge(scope, kind) => {
                registry.toggle_badge(scope, kind);
                true
            }
            Command::SetTabWidthMin(width) => {
                registry.set_tab_width_min(width);
                true
            }
            Command::ToggleCompactStyle => {
                registry.toggle_compact_style();
                true
            }
            Command::ToggleAlwaysFocusNewTabs => {
                registry.toggle_always_focus_new_tabs();
                true
            }
            Command::ToggleStandardNav => {
                registry.toggle_standard_nav();
                true
            }
            Command::ToggleReopenLastChannel => {
                registry.toggle_reopen_last_channel();
                true
            }
        }
    }

    /// A click anywhere on the bars.
    pub fn click(&self, target: ClickTarget, button: MouseButton) -> bool {
        let Some(standard_nav) = self.with_registry(|r| r.preferences().use_standard_nav) else {
            return false;
        };
        match gestures::on_click(target, button, standard_nav) {
            Some(command) => self.dispatch(command),
            None => false,
        }
    }

    /// A key press anywhere in the host window.
    pub fn handle_key(&self, event: &KeyEvent) -> bool {
        let action = self
            .shortcuts
            .borrow()
            .handle_key(event, self.window_focused.get());
        match action {
            Some(action) => self.dispatch(gestures::on_shortcut(action)),
            None => false,
        }
    }

    /// Builds a context menu against the current state.
    pub fn menu(&self, target: &MenuTarget) -> Option<Menu> {
        self.with_registry(|registry| match target {
            MenuTarget::Tab(index) => Some(context_menu::tab_menu(registry, *index)),
            MenuTarget::Favourite(index) => Some(context_menu::fav_menu(registry, *index)),
            MenuTarget::Group(group_id) => Some(context_menu::group_menu(registry, *group_id)),
            MenuTarget::FavBar => Some(context_menu::fav_bar_menu()),
            MenuTarget::HostChannel(channel_id) => {
                context_menu::host_channel_menu(&self.host, registry.preferences(), channel_id)
            }
            MenuTarget::HostGuild(guild_id) => {
                context_menu::host_guild_menu(&self.host, registry.preferences(), guild_id)
            }
        })
        .flatten()
        .filter(|menu| !menu.is_empty())
    }

    // --- drag ---

    pub fn drag_press(&self, kind: DragKind, index: usize, at: Point) -> bool {
        self.drag.borrow_mut().press(kind, index, at)
    }

    pub fn drag_hover(&self, kind: DragKind, index: usize) {
        self.drag.borrow_mut().hover(kind, index);
    }

    /// Pointer movement during a press; applies live reorders.
    pub fn drag_move(&self, kind: DragKind, at: Point) -> bool {
        let step = self.drag.borrow_mut().pointer_move(kind, at);
        match step {
            Some(step) => self.dispatch(step.command()),
            None => false,
        }
    }

    pub fn drag_release(&self, kind: DragKind) {
        self.drag.borrow_mut().release(kind);
    }

    pub fn is_dragging(&self, kind: DragKind) -> bool {
        self.drag.borrow().is_dragging(kind)
    }
}

fn open_target(registry: &mut Registry, target: HostTarget) -> bool {
    match target.channel_id.as_deref() {
        Some(channel_id) => registry.save_channel(target.guild_id.as_deref(), channel_id, &target.name, &target.icon_url),
        None => {
            let location = location_resolver::resolve(registry.host(), &target.url(), None);
            registry.open_location_in_new_tab(location)
        }
    }
}
