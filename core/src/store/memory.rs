//! In-memory rule table.
//!
//! Clones share the same table, so a test can hand one clone to the core
//! and inspect the other afterwards. Failures can be injected per rule.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use progwall_common::error::StoreError;
use progwall_common::rule::{Direction, FirewallRule, RuleId, RuleSpec};
use progwall_common::store::RuleStore;

use crate::query::{program_key, same_program};

/// How an injected failure surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The store refuses the request.
    Reject,
    /// The call never answers within its deadline.
    Stall,
}

/// Deadline reported by stalled calls.
const STALL_AFTER: Duration = Duration::from_secs(30);

impl Fault {
    fn error(self, op: &'static str, reason: String) -> StoreError {
        match self {
            Fault::Reject => StoreError::Rejected(reason),
            Fault::Stall => StoreError::Timeout {
                op,
                after: STALL_AFTER,
            },
        }
    }
}

#[derive(Default)]
struct Table {
    rules: Vec<FirewallRule>,
    next_id: u64,
    failing_creates: HashMap<(String, Direction), Fault>,
    failing_removes: HashMap<RuleId, Fault>,
    failing_queries: bool,
}

#[derive(Clone, Default)]
pub struct MemoryRuleStore {
    table: Arc<Mutex<Table>>,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Table> {
        // A panicking test thread must not take the other clones down with it.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a rule as if another tool had created it.
    pub fn insert(&self, rule: FirewallRule) {
        self.lock().rules.push(rule);
    }

    /// Snapshot of the table in enumeration order.
    pub fn rules(&self) -> Vec<FirewallRule> {
        self.lock().rules.clone()
    }

    pub fn fail_create(&self, program: impl AsRef<Path>, direction: Direction) {
        self.fault_create(program, direction, Fault::Reject);
    }

    pub fn fault_create(&self, program: impl AsRef<Path>, direction: Direction, fault: Fault) {
        self.lock()
            .failing_creates
            .insert((program_key(program.as_ref()), direction), fault);
    }

    pub fn fail_remove(&self, id: &RuleId) {
        self.fault_remove(id, Fault::Reject);
    }

    pub fn fault_remove(&self, id: &RuleId, fault: Fault) {
        self.lock().failing_removes.insert(id.clone(), fault);
    }

    pub fn fail_queries(&self, fail: bool) {
        self.lock().failing_queries = fail;
    }
}

impl RuleStore for MemoryRuleStore {
    fn query_by_program(
        &self,
        program: &Path,
        direction: Option<Direction>,
        group: Option<&str>,
    ) -> Result<Vec<FirewallRule>, StoreError> {
        let table = self.lock();
        if table.failing_queries {
            return Err(StoreError::Command {
                op: "query_by_program",
                message: "injected query failure".into(),
            });
        }

        Ok(table
            .rules
            .iter()
            .filter(|rule| same_program(&rule.program, program))
            .filter(|rule| direction.is_none_or(|d| rule.direction == d))
            .filter(|rule| group.is_none_or(|g| rule.is_owned_by(g)))
            .cloned()
            .collect())
    }

    fn query_by_group(&self, group: &str) -> Result<Vec<FirewallRule>, StoreError> {
        let table = self.lock();
        if table.failing_queries {
            return Err(StoreError::Command {
                op: "query_by_group",
                message: "injected query failure".into(),
            });
        }

        Ok(table
            .rules
            .iter()
            .filter(|rule| rule.is_owned_by(group))
            .cloned()
            .collect())
    }

    fn create_rule(&self, spec: &RuleSpec) -> Result<RuleId, StoreError> {
        let mut table = self.lock();
        if let Some(fault) = table
            .failing_creates
            .get(&(program_key(&spec.program), spec.direction))
        {
            return Err(fault.error(
                "create_rule",
                format!(
                    "cannot create {} rule for {}",
                    spec.direction,
                    spec.program.display()
                ),
            ));
        }

        table.next_id += 1;
        let id = RuleId(format!("{{mem-{:04}}}", table.next_id));
        table.rules.push(FirewallRule {
            id: id.clone(),
            display_name: spec.display_name.clone(),
            direction: spec.direction,
            group: Some(spec.group.clone()),
            program: spec.program.clone(),
            action: spec.action,
            enabled: spec.enabled,
        });
        Ok(id)
    }

    fn remove_rule(&self, id: &RuleId) -> Result<(), StoreError> {
        let mut table = self.lock();
        if let Some(fault) = table.failing_removes.get(id) {
            return Err(fault.error("remove_rule", format!("rule {id} is locked")));
        }

        let before = table.rules.len();
        table.rules.retain(|rule| &rule.id != id);
        if table.rules.len() == before {
            return Err(StoreError::Rejected(format!("no rule with id {id}")));
        }
        Ok(())
    }
}
