// ChannelTabs services
// Host binding, location resolution, derived badge state, navigation sync,
// persistence and UI mount plumbing.

pub mod badge_watcher;
pub mod derived_state;
pub mod fake_host;
pub mod host_adapter;
pub mod kv_store;
pub mod location_resolver;
pub mod mount;
pub mod navigation_bridge;
pub mod settings_engine;
