//! # Reconciler
//!
//! Brings the rule store in line with a desired state for a set of targets.
//!
//! Block checks each direction separately and only creates what is missing,
//! so running it twice changes nothing the second time. Unblock removes every
//! matching rule, one at a time. A failure is recorded against the rule or
//! direction it happened on and the batch carries on.

use progwall_common::config::UnblockScope;
use progwall_common::outcome::{Outcome, OutcomeKind};
use progwall_common::rule::{Direction, RuleSpec};
use progwall_common::store::RuleStore;
use progwall_common::target::ExecutableTarget;
use tracing::{debug, warn};

use crate::query;

pub struct Reconciler<'a> {
    store: &'a dyn RuleStore,
    group: String,
    unblock_scope: UnblockScope,
}

impl<'a> Reconciler<'a> {
    pub fn new(store: &'a dyn RuleStore, group: impl Into<String>) -> Self {
        Self {
            store,
            group: group.into(),
            unblock_scope: UnblockScope::Owned,
        }
    }

    pub fn with_unblock_scope(mut self, scope: UnblockScope) -> Self {
        self.unblock_scope = scope;
        self
    }

    /// Ensures an inbound and an outbound block rule exist for every target.
    ///
    /// Produces exactly one outcome per target and direction, in target order,
    /// inbound before outbound.
    pub fn apply_block(&self, targets: &[ExecutableTarget]) -> Vec<Outcome> {
        let mut outcomes = Vec::with_capacity(targets.len() * Direction::ALL.len());
        for target in targets {
            for direction in Direction::ALL {
                outcomes.push(self.block_direction(target, direction));
            }
        }
        outcomes
    }

    fn block_direction(&self, target: &ExecutableTarget, direction: Direction) -> Outcome {
        let program = target.path();

        // Any existing rule for the direction counts, whoever created it.
        let existing = match query::rules_for_program(self.store, program, Some(direction), None) {
            Ok(rules) => rules,
            Err(e) => {
                warn!("query failed for {target} ({direction}): {e}");
                return Outcome::new(
                    program,
                    Some(direction),
                    OutcomeKind::QueryFailed {
                        reason: e.to_string(),
                    },
                );
            }
        };

        if let Some(rule) = existing.first() {
            debug!("{direction} rule '{}' already covers {target}", rule.display_name);
            return Outcome::new(
                program,
                Some(direction),
                OutcomeKind::AlreadyExists {
                    name: rule.display_name.clone(),
                },
            );
        }

        let spec = RuleSpec::block(target, direction, &self.group);
        let kind = match self.store.create_rule(&spec) {
            Ok(id) => {
                debug!("created {direction} rule {id} for {target}");
                OutcomeKind::Created {
                    name: spec.display_name,
                }
            }
            Err(e) => {
                warn!("could not create {direction} rule for {target}: {e}");
                OutcomeKind::CreateFailed {
                    reason: e.to_string(),
                }
            }
        };
        Outcome::new(program, Some(direction), kind)
    }

    /// Removes the rules keyed by each target's program path.
    ///
    /// With [`UnblockScope::Owned`] only owner-tagged rules are removed and
    /// every other rule for the path is reported as [`OutcomeKind::Kept`];
    /// [`UnblockScope::AnyGroup`] removes every rule for the path.
    pub fn apply_unblock(&self, targets: &[ExecutableTarget]) -> Vec<Outcome> {
        targets
            .iter()
            .flat_map(|target| self.unblock_target(target))
            .collect()
    }

    fn unblock_target(&self, target: &ExecutableTarget) -> Vec<Outcome> {
        let program = target.path();

        let rules = match query::rules_for_program(self.store, program, None, None) {
            Ok(rules) => rules,
            Err(e) => {
                warn!("query failed for {target}: {e}");
                return vec![Outcome::new(
                    program,
                    None,
                    OutcomeKind::QueryFailed {
                        reason: e.to_string(),
                    },
                )];
            }
        };

        if rules.is_empty() {
            return vec![Outcome::new(program, None, OutcomeKind::NoneFound)];
        }

        rules
            .into_iter()
            .map(|rule| {
                let removable = match self.unblock_scope {
                    UnblockScope::Owned => rule.is_owned_by(&self.group),
                    UnblockScope::AnyGroup => true,
                };
                if !removable {
                    debug!("keeping rule {} for {target}, group {:?}", rule.id, rule.group);
                    return Outcome::new(
                        program,
                        Some(rule.direction),
                        OutcomeKind::Kept {
                            name: rule.display_name,
                        },
                    );
                }

                let kind = match self.store.remove_rule(&rule.id) {
                    Ok(()) => OutcomeKind::Removed {
                        name: rule.display_name,
                    },
                    Err(e) => {
                        warn!("could not remove rule {} for {target}: {e}", rule.id);
                        OutcomeKind::RemovalFailed {
                            name: rule.display_name,
                            reason: e.to_string(),
                        }
                    }
                };
                Outcome::new(program, Some(rule.direction), kind)
            })
            .collect()
    }
}
