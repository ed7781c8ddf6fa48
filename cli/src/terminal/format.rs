use colored::*;
use progwall_common::outcome::Outcome;
use progwall_core::orphans::ProgramRules;

use crate::terminal::colors;

/// Per-kind counts of a batch of outcomes.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub changed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl Tally {
    pub fn of(outcomes: &[Outcome]) -> Self {
        let mut tally = Tally::default();
        for outcome in outcomes {
            if outcome.is_failure() {
                tally.failed += 1;
            } else if outcome.is_mutation() {
                tally.changed += 1;
            } else {
                tally.unchanged += 1;
            }
        }
        tally
    }
}

/// `"<n> created, <n> already present, <n> failed"` style summary.
pub fn tally_line(tally: &Tally, changed: &str, unchanged: &str) -> String {
    let failed: ColoredString = if tally.failed > 0 {
        format!("{} failed", tally.failed).bold().color(colors::FAILURE)
    } else {
        "0 failed".normal()
    };

    format!(
        "{}, {}, {}",
        format!("{} {changed}", tally.changed).bold().color(colors::SUCCESS),
        format!("{} {unchanged}", tally.unchanged).bold().color(colors::SKIPPED),
        failed
    )
    .color(colors::TEXT_DEFAULT)
    .to_string()
}

/// Tree details for one program of the `list` command.
pub fn program_details(entry: &ProgramRules) -> Vec<(String, ColoredString)> {
    let state: ColoredString = if entry.exists {
        "present".color(colors::SUCCESS)
    } else {
        "missing".bold().color(colors::FAILURE)
    };

    let mut details: Vec<(String, ColoredString)> = vec![("State".to_string(), state)];
    for rule in &entry.rules {
        let enabled: &str = if rule.enabled { "" } else { " (disabled)" };
        details.push((
            rule.direction.to_string(),
            format!("{}{enabled}", rule.display_name).normal(),
        ));
    }
    details
}

