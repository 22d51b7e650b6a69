//! ChannelTabs: browser-style tabs, favourites and favourite groups on top of
//! a chat client's channel view.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod logging;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
