// src/core/areas.rs

//! Sub-resource handles handed out by the connection registry.
//!
//! Each area covers one slice of the server's data (changelists, workspaces,
//! users, ...) and is consumed by an external record parser that issues the
//! area's argv through an executor and drains the tagged output. The set is a
//! closed enum rather than a discovered plugin surface: the registry is the
//! only constructor, and every handle stays bound to its registry's settings
//! for connection parameters.

use crate::constants::{KEY_CLIENT, KEY_USER};
use crate::core::registry::SharedSettings;

/// The closed set of resource areas a registry can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    Changes,
    Workspaces,
    Users,
    Labels,
    Groups,
    Counters,
    Status,
}

/// A constructed, registry-owned area handle.
#[derive(Debug)]
pub enum AreaHandle {
    Changes(ChangesArea),
    Workspaces(WorkspacesArea),
    Users(UsersArea),
    Labels(LabelsArea),
    Groups(GroupsArea),
    Counters(CountersArea),
    Status(StatusArea),
}

impl AreaHandle {
    pub(crate) fn new(kind: AreaKind, settings: SharedSettings) -> Self {
        match kind {
            AreaKind::Changes => Self::Changes(ChangesArea { settings }),
            AreaKind::Workspaces => Self::Workspaces(WorkspacesArea { settings }),
            AreaKind::Users => Self::Users(UsersArea { settings }),
            AreaKind::Labels => Self::Labels(LabelsArea { settings }),
            AreaKind::Groups => Self::Groups(GroupsArea { settings }),
            AreaKind::Counters => Self::Counters(CountersArea { settings }),
            AreaKind::Status => Self::Status(StatusArea { settings }),
        }
    }

    pub fn kind(&self) -> AreaKind {
        match self {
            Self::Changes(_) => AreaKind::Changes,
            Self::Workspaces(_) => AreaKind::Workspaces,
            Self::Users(_) => AreaKind::Users,
            Self::Labels(_) => AreaKind::Labels,
            Self::Groups(_) => AreaKind::Groups,
            Self::Counters(_) => AreaKind::Counters,
            Self::Status(_) => AreaKind::Status,
        }
    }

    /// The settings binding collaborating parsers use for connection
    /// parameters.
    pub fn settings(&self) -> SharedSettings {
        match self {
            Self::Changes(a) => a.settings(),
            Self::Workspaces(a) => a.settings(),
            Self::Users(a) => a.settings(),
            Self::Labels(a) => a.settings(),
            Self::Groups(a) => a.settings(),
            Self::Counters(a) => a.settings(),
            Self::Status(a) => a.settings(),
        }
    }
}

fn setting(settings: &SharedSettings, key: &str) -> String {
    settings.borrow().get(key).to_string()
}

fn push_scope(argv: &mut Vec<String>, scope: Option<&str>) {
    if let Some(scope) = scope {
        argv.extend(scope.split_whitespace().map(String::from));
    }
}

/// Submitted-changelist queries.
#[derive(Debug)]
pub struct ChangesArea {
    settings: SharedSettings,
}

impl ChangesArea {
    /// Arguments listing the most recent `max` submitted changelists,
    /// optionally restricted to a scope computed by
    /// [`view_path`](crate::core::view_path::view_path).
    pub fn changes_args(&self, max: usize, scope: Option<&str>) -> Vec<String> {
        let mut argv = vec![
            "changes".to_string(),
            "-s".to_string(),
            "submitted".to_string(),
            "-m".to_string(),
            max.to_string(),
        ];
        push_scope(&mut argv, scope);
        argv
    }

    /// Arguments for the abbreviated description of one changelist.
    pub fn describe_args(&self, changelist: u32) -> Vec<String> {
        vec!["describe".to_string(), "-s".to_string(), changelist.to_string()]
    }

    pub fn settings(&self) -> SharedSettings {
        SharedSettings::clone(&self.settings)
    }
}

/// Client workspace specs.
#[derive(Debug)]
pub struct WorkspacesArea {
    settings: SharedSettings,
}

impl WorkspacesArea {
    /// Arguments fetching a workspace spec. Defaults to the registry's client
    /// when `name` is absent; with neither, the server falls back to its own
    /// environment-derived default.
    pub fn spec_args(&self, name: Option<&str>) -> Vec<String> {
        let mut argv = vec!["client".to_string(), "-o".to_string()];
        let name = match name {
            Some(name) => name.to_string(),
            None => setting(&self.settings, KEY_CLIENT),
        };
        if !name.is_empty() {
            argv.push(name);
        }
        argv
    }

    pub fn list_args(&self) -> Vec<String> {
        vec!["clients".to_string()]
    }

    pub fn settings(&self) -> SharedSettings {
        SharedSettings::clone(&self.settings)
    }
}

/// User specs.
#[derive(Debug)]
pub struct UsersArea {
    settings: SharedSettings,
}

impl UsersArea {
    /// Arguments fetching a user spec; defaults to the registry's user.
    pub fn spec_args(&self, name: Option<&str>) -> Vec<String> {
        let mut argv = vec!["user".to_string(), "-o".to_string()];
        let name = match name {
            Some(name) => name.to_string(),
            None => setting(&self.settings, KEY_USER),
        };
        if !name.is_empty() {
            argv.push(name);
        }
        argv
    }

    pub fn list_args(&self) -> Vec<String> {
        vec!["users".to_string()]
    }

    pub fn settings(&self) -> SharedSettings {
        SharedSettings::clone(&self.settings)
    }
}

/// Label specs and listings.
#[derive(Debug)]
pub struct LabelsArea {
    settings: SharedSettings,
}

impl LabelsArea {
    pub fn spec_args(&self, name: &str) -> Vec<String> {
        vec!["label".to_string(), "-o".to_string(), name.to_string()]
    }

    /// Arguments listing labels, optionally restricted to a depot scope.
    pub fn list_args(&self, scope: Option<&str>) -> Vec<String> {
        let mut argv = vec!["labels".to_string()];
        push_scope(&mut argv, scope);
        argv
    }

    pub fn settings(&self) -> SharedSettings {
        SharedSettings::clone(&self.settings)
    }
}

/// Group membership listings.
#[derive(Debug)]
pub struct GroupsArea {
    settings: SharedSettings,
}

impl GroupsArea {
    /// Arguments listing the groups a user belongs to; defaults to the
    /// registry's user.
    pub fn list_args(&self, user: Option<&str>) -> Vec<String> {
        let mut argv = vec!["groups".to_string()];
        let user = match user {
            Some(user) => user.to_string(),
            None => setting(&self.settings, KEY_USER),
        };
        if !user.is_empty() {
            argv.push(user);
        }
        argv
    }

    pub fn settings(&self) -> SharedSettings {
        SharedSettings::clone(&self.settings)
    }
}

/// Server counters, including the `change` counter the polling trigger reads.
#[derive(Debug)]
pub struct CountersArea {
    settings: SharedSettings,
}

impl CountersArea {
    pub fn list_args(&self) -> Vec<String> {
        vec!["counters".to_string()]
    }

    pub fn counter_args(&self, name: &str) -> Vec<String> {
        vec!["counter".to_string(), name.to_string()]
    }

    pub fn settings(&self) -> SharedSettings {
        SharedSettings::clone(&self.settings)
    }
}

/// Connection and server status.
#[derive(Debug)]
pub struct StatusArea {
    settings: SharedSettings,
}

impl StatusArea {
    pub fn info_args(&self) -> Vec<String> {
        vec!["info".to_string()]
    }

    pub fn login_status_args(&self) -> Vec<String> {
        vec!["login".to_string(), "-s".to_string()]
    }

    pub fn settings(&self) -> SharedSettings {
        SharedSettings::clone(&self.settings)
    }
}
