// Shared type definitions
// Each submodule defines plain data types used across the crate.

pub mod badges;
pub mod errors;
pub mod favourite;
pub mod host;
pub mod settings;
pub mod tab;
