//! # Reconciliation Outcomes
//!
//! One value per (executable, direction) for block, and per rule for
//! unblock. Outcomes only drive reporting and the exit status.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::rule::Direction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    Created { name: String },
    AlreadyExists { name: String },
    CreateFailed { reason: String },
    Removed { name: String },
    RemovalFailed { name: String, reason: String },
    /// A rule for the program that another tool created, left untouched.
    Kept { name: String },
    NoneFound,
    /// The store could not be read, so nothing was changed.
    QueryFailed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub program: PathBuf,
    pub direction: Option<Direction>,
    pub kind: OutcomeKind,
}

impl Outcome {
    pub fn new(program: &Path, direction: Option<Direction>, kind: OutcomeKind) -> Self {
        Self {
            program: program.to_path_buf(),
            direction,
            kind,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            OutcomeKind::CreateFailed { .. }
                | OutcomeKind::RemovalFailed { .. }
                | OutcomeKind::QueryFailed { .. }
        )
    }

    /// Whether the store was changed by this outcome.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self.kind,
            OutcomeKind::Created { .. } | OutcomeKind::Removed { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let program = self.program.display();
        let direction = self
            .direction
            .map(|d| format!("{} ", d.as_str().to_lowercase()))
            .unwrap_or_default();

        match &self.kind {
            OutcomeKind::Created { name } => {
                write!(f, "Created {direction}block rule '{name}' for {program}")
            }
            OutcomeKind::AlreadyExists { name } => {
                write!(f, "{program} already has {direction}rule '{name}'")
            }
            OutcomeKind::CreateFailed { reason } => {
                write!(f, "Failed to create {direction}rule for {program}: {reason}")
            }
            OutcomeKind::Removed { name } => {
                write!(f, "Removed {direction}rule '{name}' for {program}")
            }
            OutcomeKind::RemovalFailed { name, reason } => {
                write!(f, "Failed to remove {direction}rule '{name}' for {program}: {reason}")
            }
            OutcomeKind::Kept { name } => {
                write!(f, "Kept {direction}rule '{name}' for {program}: not created by progwall")
            }
            OutcomeKind::NoneFound => write!(f, "No rules found for {program}"),
            OutcomeKind::QueryFailed { reason } => {
                write!(f, "Could not read {direction}rules for {program}: {reason}")
            }
        }
    }
}

/// Result of an orphan purge.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PurgeReport {
    /// Number of rules actually removed.
    pub removed: usize,
    /// Distinct program paths whose removed rules were orphaned.
    pub paths: BTreeSet<PathBuf>,
    /// Orphaned rules the store refused to remove.
    pub failures: Vec<Outcome>,
}

impl PurgeReport {
    pub fn is_empty(&self) -> bool {
        self.removed == 0 && self.failures.is_empty()
    }
}
