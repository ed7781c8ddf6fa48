#![cfg(test)]
use std::collections::BTreeSet;

use progwall_common::config::{Config, UnblockScope};
use progwall_common::error::ResolveError;
use progwall_common::outcome::OutcomeKind;
use progwall_common::report::{LineStatus, VecSink};
use progwall_common::rule::{Direction, FirewallRule, RuleAction, RuleId};
use progwall_core::query::same_program;
use progwall_core::reconciler::Reconciler;
use progwall_core::report;
use progwall_core::resolver::PathResolver;
use progwall_core::store::memory::MemoryRuleStore;

use crate::utils::{Fixture, GROUP};

#[test]
fn resolution_picks_executables_recursively() {
    let fixture = Fixture::with_files(&["x.exe", "y.EXE", "z.txt", "sub/w.exe"]);

    let names: BTreeSet<String> = fixture.resolve().iter().map(|t| t.file_name()).collect();

    let expected: BTreeSet<String> = ["x.exe", "y.EXE", "w.exe"].map(String::from).into();
    assert_eq!(names, expected);
}

#[test]
fn block_twice_then_unblock_twice() {
    let fixture = Fixture::with_files(&["a.exe", "bin/b.exe", "readme.md"]);
    let targets = fixture.resolve();
    let store = MemoryRuleStore::new();
    let reconciler = Reconciler::new(&store, GROUP);

    let first = reconciler.apply_block(&targets);
    assert_eq!(first.len(), 4);
    assert!(first.iter().all(|o| matches!(o.kind, OutcomeKind::Created { .. })));
    assert_eq!(store.rules().len(), 4);

    let second = reconciler.apply_block(&targets);
    assert!(second.iter().all(|o| matches!(o.kind, OutcomeKind::AlreadyExists { .. })));
    assert_eq!(store.rules().len(), 4, "second block must not add rules");

    let removed = reconciler.apply_unblock(&targets);
    assert_eq!(removed.len(), 4);
    assert!(removed.iter().all(|o| matches!(o.kind, OutcomeKind::Removed { .. })));
    for target in &targets {
        assert!(
            !store
                .rules()
                .iter()
                .any(|rule| same_program(&rule.program, target.path())),
            "rules left for {target}"
        );
    }

    let again = reconciler.apply_unblock(&targets);
    assert_eq!(again.len(), targets.len());
    assert!(again.iter().all(|o| o.kind == OutcomeKind::NoneFound));
}

fn vendor_allow(program: std::path::PathBuf) -> FirewallRule {
    FirewallRule {
        id: RuleId("{vendor-in}".into()),
        display_name: "Vendor Allow".into(),
        direction: Direction::Inbound,
        group: None,
        program,
        action: RuleAction::Allow,
        enabled: true,
    }
}

#[test]
fn round_trip_with_a_foreign_rule_reports_what_it_keeps() {
    let fixture = Fixture::with_files(&["a.exe"]);
    let targets = fixture.resolve();
    let store = MemoryRuleStore::new();
    store.insert(vendor_allow(fixture.path("a.exe")));
    let reconciler = Reconciler::new(&store, GROUP);

    reconciler.apply_block(&targets);
    let outcomes = reconciler.apply_unblock(&targets);

    let kept: Vec<&str> = outcomes
        .iter()
        .filter_map(|o| match &o.kind {
            OutcomeKind::Kept { name } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    let left: Vec<String> = store.rules().into_iter().map(|r| r.display_name).collect();
    assert_eq!(kept, left);
    assert!(store.rules().iter().all(|r| !r.is_owned_by(GROUP)));
    assert!(outcomes.iter().all(|o| o.kind != OutcomeKind::NoneFound));
}

#[test]
fn round_trip_across_groups_leaves_nothing() {
    let fixture = Fixture::with_files(&["a.exe"]);
    let targets = fixture.resolve();
    let store = MemoryRuleStore::new();
    store.insert(vendor_allow(fixture.path("a.exe")));
    let reconciler = Reconciler::new(&store, GROUP).with_unblock_scope(UnblockScope::AnyGroup);

    reconciler.apply_block(&targets);
    reconciler.apply_unblock(&targets);

    assert!(store.rules().is_empty());
}

#[test]
fn failed_outbound_create_is_isolated() {
    let fixture = Fixture::with_files(&["1.exe", "2.exe", "3.exe"]);
    let targets = fixture.resolve();
    let store = MemoryRuleStore::new();
    store.fail_create(fixture.path("2.exe"), Direction::Outbound);

    let outcomes = Reconciler::new(&store, GROUP).apply_block(&targets);

    assert_eq!(outcomes.len(), 6);
    for outcome in &outcomes {
        let is_broken = outcome.program == fixture.path("2.exe")
            && outcome.direction == Some(Direction::Outbound);
        if is_broken {
            assert!(matches!(outcome.kind, OutcomeKind::CreateFailed { .. }));
        } else {
            assert!(
                matches!(outcome.kind, OutcomeKind::Created { .. }),
                "unexpected outcome: {outcome}"
            );
        }
    }

    let mut sink = VecSink::new();
    report::emit_outcomes(&outcomes, &mut sink);
    assert_eq!(sink.lines.len(), outcomes.len());
    assert_eq!(
        sink.lines
            .iter()
            .filter(|(status, _)| *status == LineStatus::Failure)
            .count(),
        1
    );
}

#[test]
fn resolution_errors_stop_before_the_store() {
    let fixture = Fixture::with_files(&["notes.txt"]);
    let resolver = PathResolver::from_config(&Config::default());

    let err = resolver.resolve(&fixture.path("notes.txt")).unwrap_err();
    assert!(matches!(err, ResolveError::NotExecutable(_)));

    let err = resolver.resolve(&fixture.path("missing.exe")).unwrap_err();
    assert!(matches!(err, ResolveError::PathNotFound(p) if p == fixture.path("missing.exe")));
}

#[test]
fn custom_extensions_extend_the_target_set() {
    let fixture = Fixture::with_files(&["a.exe", "b.scr", "c.dll"]);
    let cfg = Config::default().with_extensions(["exe", ".SCR"]);

    let targets = PathResolver::from_config(&cfg).resolve(fixture.root()).unwrap();

    assert_eq!(targets.len(), 2);
}
