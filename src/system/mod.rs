//! # System Interaction Layer
//!
//! This module is the boundary between the connection logic and the operating
//! system's process machinery.
//!
//! ## Modules
//!
//! - **`executor`**: spawns the version-control client, merges its stderr into
//!   its stdout through a single pipe, and exposes line-oriented reader/writer
//!   pairs, one invocation per executor instance.
//! - **`pipe`**: the deadlock-avoiding closer for pipe write ends that a host
//!   launch API keeps open past the child's lifetime.

pub mod executor;
pub mod pipe;
