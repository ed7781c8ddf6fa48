use std::path::Path;
use std::process::ExitCode;

use progwall_common::config::{Config, UnblockScope};
use progwall_common::outcome::OutcomeKind;
use progwall_core::{reconciler::Reconciler, report};
use tracing::{info, warn};

use crate::commands;
use crate::mprint;
use crate::terminal::{format, print, sink::TerminalSink, spinner};

pub fn unblock(path: &Path, cfg: &Config) -> anyhow::Result<ExitCode> {
    commands::settings(Some(path), cfg);

    let targets = commands::resolve_targets(path, cfg)?;
    if targets.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    if cfg.unblock_scope == UnblockScope::AnyGroup {
        warn!("Removing every rule for these programs, including rules from other tools");
    }

    let store = commands::open_store(cfg)?;

    let outcomes = {
        let _spinner = spinner::start(&format!("Unblocking {} executables...", targets.len()));
        Reconciler::new(&store, cfg.group.as_str())
            .with_unblock_scope(cfg.unblock_scope)
            .apply_unblock(&targets)
    };

    print::header("unblock rules", cfg.quiet);
    report::emit_outcomes(&outcomes, &mut TerminalSink);

    if outcomes.iter().any(|o| matches!(o.kind, OutcomeKind::Kept { .. })) {
        info!("Rules from other tools were kept; pass --any-group to remove them too");
    }

    if cfg.quiet < 2 {
        let tally = format::Tally::of(&outcomes);
        mprint!();
        print::fat_separator();
        print::centerln(&format::tally_line(&tally, "removed", "unchanged"));
    }

    Ok(commands::exit_status(&outcomes))
}
