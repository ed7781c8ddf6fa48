//! # Firewall Rule Model
//!
//! The subset of an OS firewall rule that progwall reads and writes. Rules
//! are owned by the external store; these values are snapshots taken at
//! query time.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::target::ExecutableTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    /// Processing order for block: inbound first, then outbound.
    pub const ALL: [Direction; 2] = [Direction::Inbound, Direction::Outbound];

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Inbound => "Inbound",
            Direction::Outbound => "Outbound",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inbound" | "in" | "1" => Ok(Direction::Inbound),
            "outbound" | "out" | "2" => Ok(Direction::Outbound),
            _ => Err(format!("invalid direction: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleAction {
    Block,
    Allow,
}

impl RuleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleAction::Block => "Block",
            RuleAction::Allow => "Allow",
        }
    }
}

impl FromStr for RuleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "block" | "4" => Ok(RuleAction::Block),
            "allow" | "2" => Ok(RuleAction::Allow),
            _ => Err(format!("invalid rule action: {s}")),
        }
    }
}

/// Network profiles a rule applies to. Progwall only ever writes `Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Any,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Any => "Any",
        }
    }
}

/// Unique store handle of a rule.
///
/// Display names are not unique, so removal always goes through this id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub String);

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirewallRule {
    pub id: RuleId,
    pub display_name: String,
    pub direction: Direction,
    pub group: Option<String>,
    pub program: PathBuf,
    pub action: RuleAction,
    pub enabled: bool,
}

impl FirewallRule {
    pub fn is_owned_by(&self, group: &str) -> bool {
        self.group.as_deref() == Some(group)
    }
}

/// A request to create a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSpec {
    pub display_name: String,
    pub direction: Direction,
    pub group: String,
    pub action: RuleAction,
    pub profile: Profile,
    pub enabled: bool,
    pub program: PathBuf,
}

impl RuleSpec {
    /// The canonical block rule for one executable and direction.
    pub fn block(target: &ExecutableTarget, direction: Direction, group: &str) -> Self {
        Self {
            display_name: target.file_name(),
            direction,
            group: group.to_string(),
            action: RuleAction::Block,
            profile: Profile::Any,
            enabled: true,
            program: target.path().to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parses_store_spellings() {
        assert_eq!("Inbound".parse::<Direction>(), Ok(Direction::Inbound));
        assert_eq!("OUTBOUND".parse::<Direction>(), Ok(Direction::Outbound));
        assert_eq!("1".parse::<Direction>(), Ok(Direction::Inbound));
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn block_spec_uses_file_name_and_owner_group() {
        let target = ExecutableTarget::new(PathBuf::from("/opt/tools/app.exe"));
        let spec = RuleSpec::block(&target, Direction::Outbound, "owner");

        assert_eq!(spec.display_name, "app.exe");
        assert_eq!(spec.group, "owner");
        assert_eq!(spec.action, RuleAction::Block);
        assert_eq!(spec.profile, Profile::Any);
        assert!(spec.enabled);
        assert_eq!(spec.program, PathBuf::from("/opt/tools/app.exe"));
    }

    #[test]
    fn ownership_requires_exact_group() {
        let rule = FirewallRule {
            id: RuleId("{1}".into()),
            display_name: "app.exe".into(),
            direction: Direction::Inbound,
            group: Some("owner".into()),
            program: PathBuf::from("/opt/app.exe"),
            action: RuleAction::Block,
            enabled: true,
        };
        assert!(rule.is_owned_by("owner"));
        assert!(!rule.is_owned_by("Owner"));
        assert!(!FirewallRule { group: None, ..rule }.is_owned_by("owner"));
    }
}
