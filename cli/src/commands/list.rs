use std::process::ExitCode;

use anyhow::Context;
use colored::*;
use progwall_common::config::Config;
use progwall_core::orphans::OrphanScanner;

use crate::commands;
use crate::mprint;
use crate::terminal::{colors, format, print, spinner};

pub fn list(cfg: &Config) -> anyhow::Result<ExitCode> {
    commands::settings(None, cfg);

    let store = commands::open_store(cfg)?;

    let listing = {
        let _spinner = spinner::start("Reading owned rules...");
        OrphanScanner::new(&store, cfg.group.as_str())
            .list()
            .context("cannot list owned rules")?
    };

    if listing.is_empty() {
        print::header("no owned rules", cfg.quiet);
        print::print_status(format!("No rules tagged '{}'", cfg.group));
        return Ok(ExitCode::SUCCESS);
    }

    print::header("owned rules", cfg.quiet);
    for (idx, entry) in listing.iter().enumerate() {
        print::tree_head(idx, &entry.program.display().to_string());
        print::as_tree_one_level(format::program_details(entry));
        if idx + 1 != listing.len() {
            mprint!();
        }
    }

    if cfg.quiet < 2 {
        let orphaned = listing.iter().filter(|entry| !entry.exists).count();
        let rules: usize = listing.iter().map(|entry| entry.rules.len()).sum();
        print::fat_separator();
        print::centerln(
            &format!(
                "{} across {} programs, {}",
                format!("{rules} rules").bold().green(),
                listing.len(),
                format!("{orphaned} orphaned").bold().color(colors::SKIPPED)
            )
            .color(colors::TEXT_DEFAULT),
        );
    }

    Ok(ExitCode::SUCCESS)
}
