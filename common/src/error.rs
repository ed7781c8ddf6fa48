//! # Error Taxonomy
//!
//! Resolution errors abort an invocation before the rule store is touched.
//! Store errors are per call: the core turns them into failed outcomes and
//! keeps going with the rest of the batch.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("not an executable: {}", .0.display())]
    NotExecutable(PathBuf),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing firewall API cannot be reached at all.
    #[error("rule store unavailable: {0}")]
    Unavailable(String),

    #[error("{op}: failed to start store command: {source}")]
    Spawn {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{op}: no answer from rule store after {after:?}")]
    Timeout { op: &'static str, after: Duration },

    #[error("{op}: {message}")]
    Command { op: &'static str, message: String },

    #[error("{op}: unreadable store output: {source}")]
    Parse {
        op: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The store refused the request itself (bad rule, missing handle).
    #[error("rejected by rule store: {0}")]
    Rejected(String),
}
