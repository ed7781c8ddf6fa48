use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use colored::*;
use progwall_common::config::Config;
use progwall_core::{reconciler::Reconciler, report};

use crate::commands;
use crate::mprint;
use crate::terminal::{colors, format, print, sink::TerminalSink, spinner};

pub fn block(path: &Path, cfg: &Config) -> anyhow::Result<ExitCode> {
    commands::settings(Some(path), cfg);

    let targets = commands::resolve_targets(path, cfg)?;
    if targets.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    let store = commands::open_store(cfg)?;
    let start_time = Instant::now();

    let outcomes = {
        let _spinner = spinner::start(&format!("Blocking {} executables...", targets.len()));
        Reconciler::new(&store, cfg.group.as_str()).apply_block(&targets)
    };

    print::header("block rules", cfg.quiet);
    report::emit_outcomes(&outcomes, &mut TerminalSink);

    if cfg.quiet < 2 {
        let tally = format::Tally::of(&outcomes);
        let elapsed: ColoredString = format!("{:.2}s", start_time.elapsed().as_secs_f64())
            .bold()
            .color(colors::ACCENT);
        mprint!();
        print::fat_separator();
        print::centerln(&format!(
            "{} in {elapsed}",
            format::tally_line(&tally, "created", "already present")
        ));
    }

    Ok(commands::exit_status(&outcomes))
}
