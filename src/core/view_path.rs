// src/core/view_path.rs

//! Computes the depot-side scope of a client workspace from its view mapping.
//!
//! History and status queries against the server must be restricted to exactly
//! the paths a client maps, or a busy depot would drown the CI trigger in
//! unrelated changes. The scope string is the space-joined list of depot path
//! prefixes, in view order, with a trailing space after each entry so it can be
//! appended directly to a command line.

use crate::constants::{DEPOT_ROOT, EXCLUSION};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ViewMapError {
    #[error("View mapping line '{0}' is missing the client-side column.")]
    MissingClientColumn(String),
    #[error("View mapping line '{0}' has no depot root marker in its depot column.")]
    MissingDepotRoot(String),
}

/// Reduces an ordered list of view-mapping lines to a scope string.
///
/// Each line pairs a depot-side pattern with a client-side pattern, separated
/// by whitespace. Exclusion lines never add scope and are dropped; every other
/// line contributes its depot column from the root marker onward. A malformed
/// line stops processing: a corrupt mapping means a broken workspace
/// configuration, and querying against a partial scope would silently hide
/// changes.
pub fn view_path<S: AsRef<str>>(lines: &[S]) -> Result<String, ViewMapError> {
    let mut scope = String::new();
    for line in lines {
        let line = line.as_ref();
        let mut columns = line.split_whitespace();
        let (Some(depot), Some(_client)) = (columns.next(), columns.next()) else {
            return Err(ViewMapError::MissingClientColumn(line.to_string()));
        };

        // An excluded pattern removes paths from the client's view; it can
        // never widen the query scope.
        if depot
            .strip_prefix(EXCLUSION)
            .is_some_and(|rest| rest.starts_with(DEPOT_ROOT))
        {
            continue;
        }

        let Some(start) = depot.find(DEPOT_ROOT) else {
            return Err(ViewMapError::MissingDepotRoot(line.to_string()));
        };
        scope.push_str(&depot[start..]);
        scope.push(' ');
    }
    Ok(scope)
}
