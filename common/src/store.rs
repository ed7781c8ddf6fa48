use std::path::Path;

use crate::error::StoreError;
use crate::rule::{Direction, FirewallRule, RuleId, RuleSpec};

/// Defines the contract for the OS firewall rule table.
///
/// The table is shared with every other tool on the host, so implementations
/// must not cache: each call reflects the store at the time it is made.
pub trait RuleStore: Send + Sync {
    /// Rules whose application filter matches `program`.
    ///
    /// `direction` and `group` narrow the result when given.
    fn query_by_program(
        &self,
        program: &Path,
        direction: Option<Direction>,
        group: Option<&str>,
    ) -> Result<Vec<FirewallRule>, StoreError>;

    /// All rules carrying the `group` tag.
    fn query_by_group(&self, group: &str) -> Result<Vec<FirewallRule>, StoreError>;

    fn create_rule(&self, spec: &RuleSpec) -> Result<RuleId, StoreError>;

    fn remove_rule(&self, id: &RuleId) -> Result<(), StoreError>;
}
