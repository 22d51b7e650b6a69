//! Click translation.
//!
//! Maps a button press on some part of the bars to the command it triggers.
//! Secondary clicks on entries open context menus (see `context_menu`) and
//! produce no command here; only the nav buttons act on them directly.

use crate::managers::command::Command;
use crate::managers::registry::CloseMode;
use crate::managers::shortcut_manager::ShortcutAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavButton {
    Left,
    Right,
    Close,
}

/// What was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Tab { index: usize, selected: bool },
    Favourite(usize),
    Group(i32),
    Nav(NavButton),
    /// Anywhere outside a group button.
    Elsewhere,
}

pub fn on_click(target: ClickTarget, button: MouseButton, use_standard_nav: bool) -> Option<Command> {
    use ClickTarget as T;
    use MouseButton as B;
    match (target, button) {
        (T::Tab { selected: true, .. }, B::Primary) => None,
        (T::Tab { index, .. }, B::Primary) => Some(Command::SwitchToTab(index)),
        (T::Tab { index, .. }, B::Middle) => Some(Command::CloseTab(index, CloseMode::Single)),

        (T::Favourite(index), B::Primary) => Some(Command::VisitFavourite(index)),
        (T::Favourite(index), B::Middle) => Some(Command::OpenFavInNewTab(index)),

        (T::Group(group_id), B::Primary) => Some(Command::ToggleGroupDropdown(group_id)),

        (T::Nav(nav), B::Primary | B::Secondary) => {
            // Standard nav puts host history on the primary button.
            let history = (button == B::Primary) == use_standard_nav;
            Some(nav_command(nav, button, history))
        }

        (T::Elsewhere, B::Primary) => Some(Command::CloseDropdowns),
        _ => None,
    }
}

fn nav_command(nav: NavButton, button: MouseButton, history: bool) -> Command {
    match nav {
        NavButton::Left if history => Command::HostBack,
        NavButton::Left => Command::PreviousTab,
        NavButton::Right if history => Command::HostForward,
        NavButton::Right => Command::NextTab,
        NavButton::Close if button == MouseButton::Primary => Command::CloseCurrentTab,
        NavButton::Close => Command::OpenNewTab,
    }
}

pub fn on_shortcut(action: ShortcutAction) -> Command {
    match action {
        ShortcutAction::CloseCurrentTab => Command::CloseCurrentTab,
        ShortcutAction::PreviousTab => Command::PreviousTab,
        ShortcutAction::NextTab => Command::NextTab,
    }
}
