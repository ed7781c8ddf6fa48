//! # Windows Defender Firewall Store
//!
//! Drives the `NetSecurity` PowerShell module. Each trait call runs one
//! PowerShell process and reads rules back as JSON.
//!
//! Requires an elevated process for mutations; the store rejects them
//! otherwise and the rejection surfaces as a failed outcome.

use std::path::{Path, PathBuf};
use std::time::Duration;

use progwall_common::error::StoreError;
use progwall_common::rule::{Direction, FirewallRule, RuleAction, RuleId, RuleSpec};
use progwall_common::store::RuleStore;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::powershell::{PowerShell, quote};

/// Projects rules in `$rules` to flat objects and prints them as a JSON array.
const PROJECT_RULES: &str = "$rows = @($rules | ForEach-Object { \
        $filter = $_ | Get-NetFirewallApplicationFilter; \
        [pscustomobject]@{ \
            Name = $_.Name; \
            DisplayName = $_.DisplayName; \
            Direction = [string]$_.Direction; \
            Group = $_.Group; \
            Action = [string]$_.Action; \
            Enabled = [string]$_.Enabled; \
            Program = [string]$filter.Program \
        } \
    }); \
    ConvertTo-Json -InputObject $rows -Compress -Depth 2";

/// Filter value the firewall uses for rules not keyed by a program.
const ANY_PROGRAM: &str = "Any";

pub struct NetSecurityStore {
    shell: PowerShell,
}

impl NetSecurityStore {
    /// Checks that the `NetSecurity` cmdlets can be invoked.
    pub fn connect(timeout: Duration) -> Result<Self, StoreError> {
        let store = Self {
            shell: PowerShell::new(timeout)?,
        };

        let probe = "if (Get-Command New-NetFirewallRule -ErrorAction SilentlyContinue) \
                     { 'ok' } else { 'missing' }";
        match store.shell.run("connect", probe) {
            Ok(out) if out.trim() == "ok" => Ok(store),
            Ok(_) => Err(StoreError::Unavailable(
                "the NetSecurity PowerShell module is not installed".into(),
            )),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    fn query(&self, op: &'static str, script: String) -> Result<Vec<FirewallRule>, StoreError> {
        let out = self.shell.run(op, &script)?;
        parse_rules(op, &out)
    }
}

impl RuleStore for NetSecurityStore {
    fn query_by_program(
        &self,
        program: &Path,
        direction: Option<Direction>,
        group: Option<&str>,
    ) -> Result<Vec<FirewallRule>, StoreError> {
        let mut rules = self.query("query_by_program", program_query(program))?;
        rules.retain(|rule| {
            direction.is_none_or(|d| rule.direction == d) && group.is_none_or(|g| rule.is_owned_by(g))
        });
        Ok(rules)
    }

    fn query_by_group(&self, group: &str) -> Result<Vec<FirewallRule>, StoreError> {
        self.query("query_by_group", group_query(group))
    }

    fn create_rule(&self, spec: &RuleSpec) -> Result<RuleId, StoreError> {
        let out = self.shell.run("create_rule", &create_script(spec))?;
        let name = out.trim();
        if name.is_empty() {
            return Err(StoreError::Rejected(format!(
                "no rule handle returned for {}",
                spec.display_name
            )));
        }
        Ok(RuleId(name.to_string()))
    }

    fn remove_rule(&self, id: &RuleId) -> Result<(), StoreError> {
        let script = format!("Remove-NetFirewallRule -Name {}", quote(&id.0));
        self.shell.run("remove_rule", &script).map(|_| ())
    }
}

/// Wraps a lookup so that "no such rule" yields an empty list while every
/// other failure still fails the call.
fn lookup(pipeline: &str) -> String {
    format!(
        "try {{ $rules = @({pipeline}) }} \
         catch {{ if ($_.CategoryInfo.Category -eq 'ObjectNotFound') {{ $rules = @() }} else {{ throw }} }}; \
         {PROJECT_RULES}"
    )
}

fn program_query(program: &Path) -> String {
    lookup(&format!(
        "Get-NetFirewallApplicationFilter -Program {} | Get-NetFirewallRule",
        quote(&program.to_string_lossy())
    ))
}

fn group_query(group: &str) -> String {
    lookup(&format!("Get-NetFirewallRule -Group {}", quote(group)))
}

fn create_script(spec: &RuleSpec) -> String {
    format!(
        "$rule = New-NetFirewallRule -DisplayName {} -Direction {} -Group {} -Action {} \
         -Profile {} -Enabled {} -Program {}; $rule.Name",
        quote(&spec.display_name),
        spec.direction.as_str(),
        quote(&spec.group),
        spec.action.as_str(),
        spec.profile.as_str(),
        if spec.enabled { "True" } else { "False" },
        quote(&spec.program.to_string_lossy()),
    )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RuleRow {
    name: String,
    display_name: String,
    direction: String,
    group: Option<String>,
    action: String,
    enabled: String,
    program: Option<String>,
}

impl RuleRow {
    fn into_rule(self) -> Option<FirewallRule> {
        let program = self
            .program
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(ANY_PROGRAM))?;

        let direction = match self.direction.parse::<Direction>() {
            Ok(d) => d,
            Err(e) => {
                warn!("ignoring rule {}: {e}", self.name);
                return None;
            }
        };

        Some(FirewallRule {
            id: RuleId(self.name),
            display_name: self.display_name,
            direction,
            group: self.group.filter(|g| !g.is_empty()),
            program: PathBuf::from(program),
            action: self.action.parse().unwrap_or(RuleAction::Allow),
            enabled: self.enabled.eq_ignore_ascii_case("true"),
        })
    }
}

/// Parses projected rules. Rows without a program filter are dropped.
fn parse_rules(op: &'static str, json: &str) -> Result<Vec<FirewallRule>, StoreError> {
    let json = json.trim();
    if json.is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(json).map_err(|source| StoreError::Parse { op, source })?;
    let rows: Vec<RuleRow> = match value {
        Value::Array(_) => serde_json::from_value::<Vec<RuleRow>>(value),
        Value::Null => Ok(Vec::new()),
        other => serde_json::from_value::<RuleRow>(other).map(|row| vec![row]),
    }
    .map_err(|source| StoreError::Parse { op, source })?;

    let total = rows.len();
    let rules: Vec<FirewallRule> = rows.into_iter().filter_map(RuleRow::into_rule).collect();
    if rules.len() != total {
        debug!("{op}: skipped {} rule(s) without a program filter", total - rules.len());
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use progwall_common::target::ExecutableTarget;

    #[test]
    fn create_script_carries_every_rule_attribute() {
        let target = ExecutableTarget::new(PathBuf::from("/games/Bob's Game/game.exe"));
        let spec = RuleSpec::block(&target, Direction::Outbound, "PS-SetProgramRule");

        let script = create_script(&spec);

        assert!(script.contains("-DisplayName 'game.exe'"));
        assert!(script.contains("-Direction Outbound"));
        assert!(script.contains("-Group 'PS-SetProgramRule'"));
        assert!(script.contains("-Action Block"));
        assert!(script.contains("-Profile Any"));
        assert!(script.contains("-Enabled True"));
        assert!(script.contains("-Program '/games/Bob''s Game/game.exe'"));
        assert!(script.ends_with("$rule.Name"));
    }

    #[test]
    fn lookups_tolerate_missing_objects_only() {
        let script = group_query("PS-SetProgramRule");
        assert!(script.contains("Get-NetFirewallRule -Group 'PS-SetProgramRule'"));
        assert!(script.contains("'ObjectNotFound'"));
        assert!(script.contains("else { throw }"));
        assert!(script.contains("ConvertTo-Json -InputObject $rows"));

        let script = program_query(Path::new("C:\\a.exe"));
        assert!(script.contains("Get-NetFirewallApplicationFilter -Program 'C:\\a.exe'"));
    }

    #[test]
    fn parses_rule_arrays() {
        let json = r#"[
            {"Name":"{A}","DisplayName":"a.exe","Direction":"Inbound","Group":"PS-SetProgramRule",
             "Action":"Block","Enabled":"True","Program":"C:\\a.exe"},
            {"Name":"{B}","DisplayName":"a.exe","Direction":"Outbound","Group":null,
             "Action":"Allow","Enabled":"False","Program":"C:\\a.exe"}
        ]"#;

        let rules = parse_rules("test", json).unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].id, RuleId("{A}".into()));
        assert_eq!(rules[0].direction, Direction::Inbound);
        assert!(rules[0].is_owned_by("PS-SetProgramRule"));
        assert_eq!(rules[0].action, RuleAction::Block);
        assert!(rules[0].enabled);
        assert_eq!(rules[0].program, PathBuf::from("C:\\a.exe"));
        assert_eq!(rules[1].group, None);
        assert!(!rules[1].enabled);
    }

    #[test]
    fn parses_single_objects_and_empty_output() {
        let json = r#"{"Name":"{A}","DisplayName":"a.exe","Direction":"Outbound","Group":"g",
                       "Action":"Block","Enabled":"True","Program":"C:\\a.exe"}"#;
        assert_eq!(parse_rules("test", json).unwrap().len(), 1);
        assert!(parse_rules("test", "").unwrap().is_empty());
        assert!(parse_rules("test", "[]").unwrap().is_empty());
        assert!(parse_rules("test", "null").unwrap().is_empty());
    }

    #[test]
    fn rules_without_program_filter_are_dropped() {
        let json = r#"[{"Name":"{A}","DisplayName":"all","Direction":"Inbound","Group":"g",
                        "Action":"Block","Enabled":"True","Program":"Any"}]"#;
        assert!(parse_rules("test", json).unwrap().is_empty());
    }

    #[test]
    fn malformed_output_is_a_parse_error() {
        let err = parse_rules("query_by_group", "WARNING: something").unwrap_err();
        assert!(matches!(err, StoreError::Parse { op: "query_by_group", .. }));
    }
}
