// src/core/registry.rs

//! Per-connection settings and the lazy sub-resource cache.
//!
//! One `ConnectionRegistry` instance backs one logical CI job. It is passed
//! explicitly to every collaborator instead of living behind a process-wide
//! singleton, and nothing in it is internally synchronized: concurrent job
//! invocations take separate registry instances. The shared-settings handle is
//! an `Rc`, which keeps the whole structure deliberately non-`Send`.

use crate::constants::{
    DEFAULT_EXECUTABLE, DEFAULT_PATHEXT, DEFAULT_PORT, DEFAULT_SYSTEM_DRIVE, DEFAULT_SYSTEM_ROOT,
    ENV_CLIENT, ENV_PASSWORD, ENV_PATH, ENV_PATHEXT, ENV_PORT, ENV_SYSTEM_DRIVE, ENV_SYSTEM_ROOT,
    ENV_USER, KEY_CLIENT, KEY_EXECUTABLE, KEY_PASSWORD, KEY_PATH, KEY_PORT, KEY_SERVER_TIMEOUT,
    KEY_SYSTEM_DRIVE, KEY_SYSTEM_ROOT, KEY_TICKET, KEY_USER,
};
use crate::core::areas::{
    AreaHandle, AreaKind, ChangesArea, CountersArea, GroupsArea, LabelsArea, StatusArea,
    UsersArea, WorkspacesArea,
};
use crate::system::executor::ExecutorFactory;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Settings shared between a registry and the area handles it hands out.
pub type SharedSettings = Rc<RefCell<Settings>>;

/// The named connection parameters of one registry.
///
/// Populated with defaults at construction, so the map is never empty. Every
/// successful mutation marks the executor environment stale; the flag is
/// cleared only when the factory is resynced.
#[derive(Debug)]
pub struct Settings {
    values: HashMap<String, String>,
    env_stale: bool,
}

impl Settings {
    fn with_defaults() -> Self {
        let mut values = HashMap::new();
        for key in [
            KEY_USER,
            KEY_CLIENT,
            KEY_PASSWORD,
            KEY_PATH,
            KEY_SERVER_TIMEOUT,
            KEY_TICKET,
        ] {
            values.insert(key.to_string(), String::new());
        }
        values.insert(KEY_PORT.to_string(), DEFAULT_PORT.to_string());
        values.insert(KEY_EXECUTABLE.to_string(), DEFAULT_EXECUTABLE.to_string());
        values.insert(KEY_SYSTEM_DRIVE.to_string(), DEFAULT_SYSTEM_DRIVE.to_string());
        values.insert(KEY_SYSTEM_ROOT.to_string(), DEFAULT_SYSTEM_ROOT.to_string());
        Self {
            values,
            env_stale: true,
        }
    }

    /// Stores `value` under `key` and marks the environment stale.
    ///
    /// An absent value is swallowed on purpose and the previous value
    /// survives; this layer performs no validation of setter input.
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        let Some(value) = value else {
            log::trace!("Ignoring absent value for setting '{}'.", key);
            return;
        };
        self.values.insert(key.to_string(), value.to_string());
        self.env_stale = true;
    }

    /// The stored value, or the empty string for an unknown key.
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map(String::as_str).unwrap_or("")
    }

    /// The stored value, substituting `default` when it is absent or empty.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.values.get(key) {
            Some(value) if !value.is_empty() => value,
            _ => default,
        }
    }

    pub fn env_stale(&self) -> bool {
        self.env_stale
    }

    fn mark_synced(&mut self) {
        self.env_stale = false;
    }
}

macro_rules! typed_setting {
    ($(#[$doc:meta])* $getter:ident, $setter:ident, $key:expr) => {
        $(#[$doc])*
        pub fn $getter(&self) -> String {
            self.settings.borrow().get($key).to_string()
        }

        pub fn $setter(&mut self, value: Option<&str>) {
            self.settings.borrow_mut().set($key, value);
        }
    };
}

/// Owns one connection's settings, its executor factory, and the cache of
/// sub-resource handles.
#[derive(Debug)]
pub struct ConnectionRegistry {
    settings: SharedSettings,
    factory: ExecutorFactory,
    areas: HashMap<AreaKind, Box<AreaHandle>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            settings: Rc::new(RefCell::new(Settings::with_defaults())),
            factory: ExecutorFactory::new(),
            areas: HashMap::new(),
        }
    }

    typed_setting!(user, set_user, KEY_USER);
    typed_setting!(client, set_client, KEY_CLIENT);
    typed_setting!(port, set_port, KEY_PORT);
    typed_setting!(password, set_password, KEY_PASSWORD);
    typed_setting!(search_path, set_search_path, KEY_PATH);
    typed_setting!(executable, set_executable, KEY_EXECUTABLE);
    typed_setting!(system_drive, set_system_drive, KEY_SYSTEM_DRIVE);
    typed_setting!(system_root, set_system_root, KEY_SYSTEM_ROOT);
    typed_setting!(
        /// The stored timeout threshold. Never enforced by the executor;
        /// bounding a command's lifetime is the caller's concern, via the
        /// process handle.
        server_timeout,
        set_server_timeout,
        KEY_SERVER_TIMEOUT
    );
    typed_setting!(ticket, set_ticket, KEY_TICKET);

    /// Generic counterpart of the typed setters; `None` is the same silent
    /// no-op.
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        self.settings.borrow_mut().set(key, value);
    }

    /// Generic counterpart of the typed getters.
    pub fn get(&self, key: &str) -> String {
        self.settings.borrow().get(key).to_string()
    }

    /// Like [`ConnectionRegistry::get`], substituting `default` when the
    /// stored value is absent or empty.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.settings.borrow().get_or(key, default).to_string()
    }

    /// The settings handle the registry shares with its area handles.
    pub fn settings(&self) -> SharedSettings {
        Rc::clone(&self.settings)
    }

    /// The executor factory, resynced to the current settings.
    ///
    /// The environment is rebuilt lazily, only when a setter has run since the
    /// last sync, so a burst of setter calls costs one rebuild.
    pub fn executor_factory(&mut self) -> &ExecutorFactory {
        if self.settings.borrow().env_stale() {
            let env = self.build_env();
            log::debug!("Resyncing executor environment ({} vars).", env.len());
            self.factory.set_env(env);
            self.settings.borrow_mut().mark_synced();
        }
        &self.factory
    }

    /// Convenience for the common path: one fresh executor synced to the
    /// current settings.
    pub fn new_executor(&mut self) -> crate::system::executor::Executor {
        self.executor_factory().new_executor()
    }

    fn build_env(&self) -> HashMap<String, String> {
        let settings = self.settings.borrow();
        let mut env = HashMap::new();
        env.insert(ENV_USER.to_string(), settings.get(KEY_USER).to_string());
        env.insert(ENV_CLIENT.to_string(), settings.get(KEY_CLIENT).to_string());
        env.insert(
            ENV_PORT.to_string(),
            settings.get_or(KEY_PORT, DEFAULT_PORT).to_string(),
        );

        // A ticket stands in for the password when present.
        let ticket = settings.get(KEY_TICKET);
        let secret = if ticket.is_empty() {
            settings.get(KEY_PASSWORD)
        } else {
            ticket
        };
        env.insert(ENV_PASSWORD.to_string(), secret.to_string());

        let path = settings.get(KEY_PATH);
        if !path.is_empty() {
            env.insert(ENV_PATH.to_string(), path.to_string());
        }

        if cfg!(windows) {
            env.insert(
                ENV_SYSTEM_DRIVE.to_string(),
                settings.get_or(KEY_SYSTEM_DRIVE, DEFAULT_SYSTEM_DRIVE).to_string(),
            );
            env.insert(
                ENV_SYSTEM_ROOT.to_string(),
                settings.get_or(KEY_SYSTEM_ROOT, DEFAULT_SYSTEM_ROOT).to_string(),
            );
            env.insert(ENV_PATHEXT.to_string(), DEFAULT_PATHEXT.to_string());
        }

        env
    }

    /// The handle for `kind`, constructed on first request and cached for the
    /// registry's lifetime. No handle is ever constructed twice.
    pub fn resource_area(&mut self, kind: AreaKind) -> &AreaHandle {
        let settings = &self.settings;
        self.areas.entry(kind).or_insert_with(|| {
            log::debug!("Constructing resource area {:?}.", kind);
            Box::new(AreaHandle::new(kind, Rc::clone(settings)))
        })
    }

    pub fn changes(&mut self) -> &ChangesArea {
        match self.resource_area(AreaKind::Changes) {
            AreaHandle::Changes(area) => area,
            _ => unreachable!("area cache is keyed by kind"),
        }
    }

    pub fn workspaces(&mut self) -> &WorkspacesArea {
        match self.resource_area(AreaKind::Workspaces) {
            AreaHandle::Workspaces(area) => area,
            _ => unreachable!("area cache is keyed by kind"),
        }
    }

    pub fn users(&mut self) -> &UsersArea {
        match self.resource_area(AreaKind::Users) {
            AreaHandle::Users(area) => area,
            _ => unreachable!("area cache is keyed by kind"),
        }
    }

    pub fn labels(&mut self) -> &LabelsArea {
        match self.resource_area(AreaKind::Labels) {
            AreaHandle::Labels(area) => area,
            _ => unreachable!("area cache is keyed by kind"),
        }
    }

    pub fn groups(&mut self) -> &GroupsArea {
        match self.resource_area(AreaKind::Groups) {
            AreaHandle::Groups(area) => area,
            _ => unreachable!("area cache is keyed by kind"),
        }
    }

    pub fn counters(&mut self) -> &CountersArea {
        match self.resource_area(AreaKind::Counters) {
            AreaHandle::Counters(area) => area,
            _ => unreachable!("area cache is keyed by kind"),
        }
    }

    pub fn status(&mut self) -> &StatusArea {
        match self.resource_area(AreaKind::Status) {
            AreaHandle::Status(area) => area,
            _ => unreachable!("area cache is keyed by kind"),
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ENV_PASSWORD, ENV_PORT, ENV_USER};

    #[test]
    fn absent_setter_values_preserve_the_previous_value() {
        let mut registry = ConnectionRegistry::new();
        registry.set_user(Some("alice"));
        registry.set_user(None);
        assert_eq!(registry.user(), "alice");
    }

    #[test]
    fn generic_accessors_mirror_the_typed_ones() {
        let mut registry = ConnectionRegistry::new();
        registry.set(KEY_CLIENT, Some("build_ws"));
        assert_eq!(registry.client(), "build_ws");
        assert_eq!(registry.get(KEY_CLIENT), "build_ws");
        registry.set(KEY_CLIENT, None);
        assert_eq!(registry.get(KEY_CLIENT), "build_ws");
        assert_eq!(registry.get_or(KEY_USER, "fallback"), "fallback");
    }

    #[test]
    fn defaults_are_populated_at_construction() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.port(), DEFAULT_PORT);
        assert_eq!(registry.executable(), DEFAULT_EXECUTABLE);
        assert_eq!(registry.user(), "");
    }

    #[test]
    fn get_or_substitutes_on_absent_and_empty_values() {
        let mut registry = ConnectionRegistry::new();
        {
            let settings = registry.settings();
            let settings = settings.borrow();
            assert_eq!(settings.get_or("no_such_key", "fallback"), "fallback");
            assert_eq!(settings.get_or(KEY_USER, "fallback"), "fallback");
        }
        registry.set_user(Some("bob"));
        let settings = registry.settings();
        assert_eq!(settings.borrow().get_or(KEY_USER, "fallback"), "bob");
    }

    #[test]
    fn factory_env_reflects_the_settings() {
        let mut registry = ConnectionRegistry::new();
        registry.set_user(Some("alice"));
        registry.set_port(Some("perforce:1666"));
        registry.set_password(Some("swordfish"));

        let env = registry.executor_factory().env().clone();
        assert_eq!(env.get(ENV_USER).map(String::as_str), Some("alice"));
        assert_eq!(env.get(ENV_PORT).map(String::as_str), Some("perforce:1666"));
        assert_eq!(env.get(ENV_PASSWORD).map(String::as_str), Some("swordfish"));
        // No search path configured, so the child inherits the parent's PATH.
        assert!(!env.contains_key(crate::constants::ENV_PATH));
    }

    #[test]
    fn ticket_substitutes_for_the_password() {
        let mut registry = ConnectionRegistry::new();
        registry.set_password(Some("swordfish"));
        registry.set_ticket(Some("A1B2C3D4"));
        let env = registry.executor_factory().env().clone();
        assert_eq!(env.get(ENV_PASSWORD).map(String::as_str), Some("A1B2C3D4"));
    }

    #[test]
    fn env_resync_is_lazy() {
        let mut registry = ConnectionRegistry::new();
        registry.set_user(Some("alice"));
        assert!(registry.settings().borrow().env_stale());

        registry.executor_factory();
        assert!(!registry.settings().borrow().env_stale());

        // A swallowed no-op setter does not mark the environment stale.
        registry.set_user(None);
        assert!(!registry.settings().borrow().env_stale());

        registry.set_user(Some("bob"));
        assert!(registry.settings().borrow().env_stale());
        let env = registry.executor_factory().env().clone();
        assert_eq!(env.get(ENV_USER).map(String::as_str), Some("bob"));
    }

    #[test]
    fn resource_areas_are_constructed_at_most_once() {
        let mut registry = ConnectionRegistry::new();
        let first = registry.resource_area(AreaKind::Changes) as *const AreaHandle;

        // Populating other slots must not disturb the cached handle.
        for kind in [
            AreaKind::Workspaces,
            AreaKind::Users,
            AreaKind::Labels,
            AreaKind::Groups,
            AreaKind::Counters,
            AreaKind::Status,
        ] {
            registry.resource_area(kind);
        }

        let second = registry.resource_area(AreaKind::Changes) as *const AreaHandle;
        assert_eq!(first, second);
    }

    #[test]
    fn typed_accessors_return_the_matching_area() {
        let mut registry = ConnectionRegistry::new();
        assert_eq!(registry.resource_area(AreaKind::Status).kind(), AreaKind::Status);
        // The typed accessor and the generic lookup share one cache slot.
        let via_typed = registry.status() as *const StatusArea;
        let via_generic = match registry.resource_area(AreaKind::Status) {
            AreaHandle::Status(area) => area as *const StatusArea,
            _ => unreachable!(),
        };
        assert_eq!(via_typed, via_generic);
    }

    #[test]
    fn areas_observe_later_settings_mutations() {
        let mut registry = ConnectionRegistry::new();
        let settings = registry.resource_area(AreaKind::Counters).settings();
        registry.set_client(Some("late_ws"));
        assert_eq!(settings.borrow().get(KEY_CLIENT), "late_ws");
    }
}
