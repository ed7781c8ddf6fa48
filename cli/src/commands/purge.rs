use std::process::ExitCode;

use anyhow::Context;
use progwall_common::config::Config;
use progwall_core::{orphans::OrphanScanner, report};

use crate::commands;
use crate::terminal::{print, sink::TerminalSink, spinner};

pub fn purge(cfg: &Config) -> anyhow::Result<ExitCode> {
    commands::settings(None, cfg);

    let store = commands::open_store(cfg)?;

    let purge_report = {
        let _spinner = spinner::start("Looking for orphaned rules...");
        OrphanScanner::new(&store, cfg.group.as_str())
            .purge()
            .context("cannot list owned rules")?
    };

    print::header("purge", cfg.quiet);
    report::emit_purge(&purge_report, &mut TerminalSink);

    if purge_report.failures.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
