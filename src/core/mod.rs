// src/core/mod.rs

pub mod areas;
pub mod config_store;
pub mod obfuscate;
pub mod registry;
pub mod view_path;
