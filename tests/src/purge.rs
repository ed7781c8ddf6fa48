#![cfg(test)]
use std::fs;
use std::path::PathBuf;

use progwall_common::report::{LineStatus, VecSink};
use progwall_common::rule::{Direction, FirewallRule, RuleAction, RuleId};
use progwall_common::store::RuleStore;
use progwall_core::orphans::OrphanScanner;
use progwall_core::reconciler::Reconciler;
use progwall_core::report;
use progwall_core::store::memory::MemoryRuleStore;

use crate::utils::{Fixture, GROUP};

#[test]
fn purge_removes_rules_of_deleted_executables_only() {
    let fixture = Fixture::with_files(&["a.exe", "b.exe"]);
    let targets = fixture.resolve();
    let store = MemoryRuleStore::new();

    Reconciler::new(&store, GROUP).apply_block(&targets);
    // Keep only {A-in, A-out, B-in}.
    let b_out = store
        .rules()
        .into_iter()
        .find(|r| r.program == fixture.path("b.exe") && r.direction == Direction::Outbound)
        .unwrap();
    store.remove_rule(&b_out.id).unwrap();

    fs::remove_file(fixture.path("a.exe")).unwrap();

    let purge = OrphanScanner::new(&store, GROUP).purge().unwrap();

    assert_eq!(purge.removed, 2);
    assert_eq!(
        purge.paths.iter().cloned().collect::<Vec<PathBuf>>(),
        vec![fixture.path("a.exe")]
    );

    let left = store.rules();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].program, fixture.path("b.exe"));
    assert_eq!(left[0].direction, Direction::Inbound);

    let mut sink = VecSink::new();
    report::emit_purge(&purge, &mut sink);
    assert_eq!(sink.lines.len(), 1);
    assert_eq!(sink.lines[0].0, LineStatus::Summary);
    assert!(sink.lines[0].1.starts_with("Purged 2 orphaned rules:"));
    assert!(sink.lines[0].1.ends_with(&fixture.path("a.exe").display().to_string()));
}

#[test]
fn purge_leaves_other_groups_alone() {
    let store = MemoryRuleStore::new();
    store.insert(FirewallRule {
        id: RuleId("{vendor}".into()),
        display_name: "ghost.exe".into(),
        direction: Direction::Outbound,
        group: Some("VendorTool".into()),
        program: PathBuf::from("/definitely/not/here/ghost.exe"),
        action: RuleAction::Block,
        enabled: true,
    });
    store.insert(FirewallRule {
        id: RuleId("{untagged}".into()),
        display_name: "ghost.exe".into(),
        direction: Direction::Inbound,
        group: None,
        program: PathBuf::from("/definitely/not/here/ghost.exe"),
        action: RuleAction::Block,
        enabled: true,
    });

    let purge = OrphanScanner::new(&store, GROUP).purge().unwrap();

    assert_eq!(purge.removed, 0);
    assert!(purge.paths.is_empty());
    assert_eq!(store.rules().len(), 2);
}

#[test]
fn purge_with_nothing_orphaned_changes_nothing() {
    let fixture = Fixture::with_files(&["keep.exe"]);
    let store = MemoryRuleStore::new();
    Reconciler::new(&store, GROUP).apply_block(&fixture.resolve());

    let purge = OrphanScanner::new(&store, GROUP).purge().unwrap();

    assert!(purge.is_empty());
    assert_eq!(store.rules().len(), 2);
    assert_eq!(report::purge_summary(&purge), "Purged 0 orphaned rules");
}
