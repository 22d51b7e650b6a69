//! Navigation Bridge.
//!
//! Keeps the registry's selected tab and the host's actual location in step.
//! Outbound requests run under a `switching` guard so the location-changed
//! event they cause is not mistaken for an external navigation.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

use crate::services::host_adapter::{HostAdapter, Navigator};
use crate::services::location_resolver::{self, ResolvedLocation};

/// Sets the shared `switching` flag for as long as it lives.
struct SwitchGuard<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> SwitchGuard<'a> {
    fn engage(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for SwitchGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// What an inbound location change should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// The change was caused by our own navigation request.
    Ignore,
    /// The user navigated through the host; refresh the selected tab.
    Refresh(ResolvedLocation),
}

/// Cheap to clone; clones share the same `switching` flag.
#[derive(Clone)]
pub struct NavigationBridge {
    navigator: Rc<dyn Navigator>,
    switching: Rc<Cell<bool>>,
}

impl NavigationBridge {
    pub fn new(navigator: Rc<dyn Navigator>) -> Self {
        Self {
            navigator,
            switching: Rc::new(Cell::new(false)),
        }
    }

    /// Whether an outbound navigation is in flight.
    pub fn is_switching(&self) -> bool {
        self.switching.get()
    }

    /// Outbound: asks the host to show `url`.
    pub fn navigate(&self, url: &str) {
        let _guard = SwitchGuard::engage(&self.switching);
        debug!(url, "navigating host");
        self.navigator.navigate_to(url);
    }

    /// Outbound without the guard: the resulting location change is handled
    /// like a user navigation, so the selected tab follows it.
    pub fn visit(&self, url: &str) {
        debug!(url, "visiting");
        self.navigator.navigate_to(url);
    }

    pub fn back(&self) {
        self.navigator.navigate_back();
    }

    pub fn forward(&self) {
        self.navigator.navigate_forward();
    }

    /// Inbound: decides what a host location change means for the registry.
    pub fn on_location_changed(&self, host: &HostAdapter, path: &str) -> Inbound {
        if self.is_switching() {
            debug!(path, "ignoring self-triggered location change");
            return Inbound::Ignore;
        }
        let channel_id = host.selection().selected_channel_id(None);
        Inbound::Refresh(location_resolver::resolve(host, path, channel_id))
    }
}
