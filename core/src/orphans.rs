//! # Orphan Scanner
//!
//! Finds owner-tagged rules whose program file is gone and removes them.
//!
//! `orphaned = { rule in owned : !exists(rule.program) }`. Rules outside the
//! owner group are never looked at, whatever their program path.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use progwall_common::error::StoreError;
use progwall_common::outcome::{Outcome, OutcomeKind, PurgeReport};
use progwall_common::rule::FirewallRule;
use progwall_common::store::RuleStore;
use tracing::{debug, warn};

use crate::query;

/// Owned rules of one program path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramRules {
    pub program: PathBuf,
    pub exists: bool,
    pub rules: Vec<FirewallRule>,
}

pub struct OrphanScanner<'a> {
    store: &'a dyn RuleStore,
    group: String,
    exists: fn(&Path) -> bool,
}

impl<'a> OrphanScanner<'a> {
    pub fn new(store: &'a dyn RuleStore, group: impl Into<String>) -> Self {
        Self {
            store,
            group: group.into(),
            exists: program_exists,
        }
    }

    /// Replaces the filesystem existence check.
    pub fn with_exists_check(mut self, exists: fn(&Path) -> bool) -> Self {
        self.exists = exists;
        self
    }

    /// Owned rules grouped by program path, sorted by path.
    pub fn list(&self) -> Result<Vec<ProgramRules>, StoreError> {
        let mut by_program: BTreeMap<PathBuf, Vec<FirewallRule>> = BTreeMap::new();
        for rule in query::owned_rules(self.store, &self.group)? {
            by_program.entry(rule.program.clone()).or_default().push(rule);
        }

        Ok(by_program
            .into_iter()
            .map(|(program, rules)| ProgramRules {
                exists: (self.exists)(&program),
                program,
                rules,
            })
            .collect())
    }

    /// Owned rules whose program path no longer exists.
    pub fn orphans(&self) -> Result<Vec<FirewallRule>, StoreError> {
        let owned = query::owned_rules(self.store, &self.group)?;
        Ok(owned
            .into_iter()
            .filter(|rule| !(self.exists)(&rule.program))
            .collect())
    }

    /// Removes every orphaned owned rule.
    ///
    /// A failing owned-rule query aborts before anything is removed. A failing
    /// removal is recorded in the report and the remaining rules are still
    /// attempted.
    pub fn purge(&self) -> Result<PurgeReport, StoreError> {
        let orphans = self.orphans()?;
        let mut report = PurgeReport::default();

        if orphans.is_empty() {
            debug!("no orphaned rules in group '{}'", self.group);
            return Ok(report);
        }

        debug!("{} orphaned rule(s) in group '{}'", orphans.len(), self.group);

        // Paths are reported once per program, however the store spells them.
        let mut seen = HashSet::new();
        for rule in orphans {
            match self.store.remove_rule(&rule.id) {
                Ok(()) => {
                    report.removed += 1;
                    if seen.insert(query::program_key(&rule.program)) {
                        report.paths.insert(rule.program);
                    }
                }
                Err(e) => {
                    warn!("could not remove orphaned rule {}: {e}", rule.id);
                    report.failures.push(Outcome::new(
                        &rule.program,
                        Some(rule.direction),
                        OutcomeKind::RemovalFailed {
                            name: rule.display_name,
                            reason: e.to_string(),
                        },
                    ));
                }
            }
        }

        Ok(report)
    }
}

/// Missing and unreadable both count as gone.
fn program_exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}
