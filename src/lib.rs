// src/lib.rs

//! Process-driving adapter between a CI job and the Perforce command-line
//! client.
//!
//! The [`core::registry::ConnectionRegistry`] holds one job's connection
//! settings and hands out cached sub-resource handles; the
//! [`system::executor`] layer spawns the external tool and exposes
//! line-oriented streams over its merged output. Stateless utilities compute
//! depot query scopes from client views ([`core::view_path`]) and reversibly
//! obfuscate stored credentials ([`core::obfuscate`]).

pub mod constants;
pub mod core;
pub mod system;

pub use crate::core::registry::ConnectionRegistry;
pub use crate::system::executor::{ExecError, Executor, ExecutorFactory};
