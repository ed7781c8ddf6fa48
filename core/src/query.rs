//! Rule lookups shared by the reconciler and the orphan scanner.
//!
//! Results from the store are filtered again here so that a store returning
//! more than was asked for can never widen what progwall mutates.

use std::path::Path;

use progwall_common::error::StoreError;
use progwall_common::rule::{Direction, FirewallRule};
use progwall_common::store::RuleStore;
use tracing::debug;

/// Comparison key for program paths.
///
/// The firewall matches application filters case-insensitively and does not
/// care about separator style.
pub fn program_key(path: &Path) -> String {
    path.to_string_lossy().replace('/', "\\").to_lowercase()
}

pub fn same_program(a: &Path, b: &Path) -> bool {
    program_key(a) == program_key(b)
}

/// Rules keyed by `program`, optionally narrowed by direction and group.
///
/// Store enumeration order is preserved.
pub fn rules_for_program(
    store: &dyn RuleStore,
    program: &Path,
    direction: Option<Direction>,
    group: Option<&str>,
) -> Result<Vec<FirewallRule>, StoreError> {
    let mut rules = store.query_by_program(program, direction, group)?;
    rules.retain(|rule| {
        same_program(&rule.program, program)
            && direction.is_none_or(|d| rule.direction == d)
            && group.is_none_or(|g| rule.is_owned_by(g))
    });

    debug!(
        "{} rule(s) for {} (direction: {}, group: {})",
        rules.len(),
        program.display(),
        direction.map(|d| d.as_str()).unwrap_or("any"),
        group.unwrap_or("any"),
    );
    Ok(rules)
}

/// Every rule carrying the owner tag, and nothing else.
pub fn owned_rules(store: &dyn RuleStore, group: &str) -> Result<Vec<FirewallRule>, StoreError> {
    let mut rules = store.query_by_group(group)?;
    rules.retain(|rule| rule.is_owned_by(group));
    debug!("{} rule(s) tagged '{group}'", rules.len());
    Ok(rules)
}
