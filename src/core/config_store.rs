// src/core/config_store.rs

//! Load/save of persisted connection settings.
//!
//! The on-disk format is a small TOML file. Credential fields are stored only
//! in obfuscated form: `save` routes them through the obfuscator unless they
//! already carry the marker, and `load` reveals them before they reach the
//! in-memory registry. Plaintext secrets in a hand-edited file are accepted on
//! load and obfuscated on the next save.

use crate::core::obfuscate;
use crate::core::registry::ConnectionRegistry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The on-disk shape of one stored connection.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoredConnection {
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub port: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub executable: String,
    #[serde(default)]
    pub server_timeout: String,
    #[serde(default)]
    pub ticket: String,
}

/// The default location of the connection file.
pub fn default_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("Could not determine the user configuration directory.")?;
    Ok(dir.join("p4link").join("connection.toml"))
}

/// Reads a connection file and builds a registry from it.
pub fn load(path: &Path) -> Result<ConnectionRegistry> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read connection file '{}'.", path.display()))?;
    let stored: StoredConnection = toml::from_str(&raw)
        .with_context(|| format!("Connection file '{}' is not valid TOML.", path.display()))?;
    into_registry(stored)
}

/// Builds a registry from an already-deserialized connection, revealing the
/// stored secrets.
pub fn into_registry(stored: StoredConnection) -> Result<ConnectionRegistry> {
    let password = reveal_secret(&stored.password).context("Stored password could not be decoded.")?;
    let ticket = reveal_secret(&stored.ticket).context("Stored ticket could not be decoded.")?;

    // Empty fields stay on the registry's construction defaults; the
    // None-swallowing setter contract makes that a one-liner per field.
    let mut registry = ConnectionRegistry::new();
    registry.set_user(non_empty(&stored.user));
    registry.set_client(non_empty(&stored.client));
    registry.set_port(non_empty(&stored.port));
    registry.set_password(non_empty(&password));
    registry.set_search_path(non_empty(&stored.path));
    registry.set_executable(non_empty(&stored.executable));
    registry.set_server_timeout(non_empty(&stored.server_timeout));
    registry.set_ticket(non_empty(&ticket));
    Ok(registry)
}

/// Writes the registry's settings to a connection file, secrets obfuscated.
pub fn save(registry: &ConnectionRegistry, path: &Path) -> Result<()> {
    let settings = registry.settings();
    let settings = settings.borrow();
    let stored = StoredConnection {
        user: settings.get(crate::constants::KEY_USER).to_string(),
        client: settings.get(crate::constants::KEY_CLIENT).to_string(),
        port: settings.get(crate::constants::KEY_PORT).to_string(),
        password: protect_secret(settings.get(crate::constants::KEY_PASSWORD)),
        path: settings.get(crate::constants::KEY_PATH).to_string(),
        executable: settings.get(crate::constants::KEY_EXECUTABLE).to_string(),
        server_timeout: settings.get(crate::constants::KEY_SERVER_TIMEOUT).to_string(),
        ticket: protect_secret(settings.get(crate::constants::KEY_TICKET)),
    };
    drop(settings);

    let raw = toml::to_string_pretty(&stored).context("Failed to serialize connection settings.")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create configuration directory '{}'.", parent.display())
        })?;
    }
    fs::write(path, raw)
        .with_context(|| format!("Failed to write connection file '{}'.", path.display()))?;
    log::debug!("Connection settings written to '{}'.", path.display());
    Ok(())
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

fn reveal_secret(value: &str) -> Result<String, obfuscate::ObfuscateError> {
    if obfuscate::looks_encrypted(Some(value)) {
        obfuscate::decrypt(value)
    } else {
        Ok(value.to_string())
    }
}

fn protect_secret(value: &str) -> String {
    if value.is_empty() || obfuscate::looks_encrypted(Some(value)) {
        value.to_string()
    } else {
        obfuscate::encrypt(Some(value))
    }
}
