pub mod block;
pub mod list;
pub mod purge;
pub mod unblock;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use colored::*;
use progwall_common::config::{Config, DEFAULT_GROUP};
use progwall_common::outcome::Outcome;
use progwall_common::target::ExecutableTarget;
use progwall_core::resolver::PathResolver;
use progwall_core::store::netsecurity::NetSecurityStore;
use tracing::warn;

use crate::terminal::{colors, print};

#[derive(Parser)]
#[command(name = "progwall")]
#[command(version)]
#[command(about = "Blocks executables in the Windows firewall and cleans up stale rules.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// Group tag marking rules owned by this tool
    #[arg(long, global = true, value_name = "TAG", default_value = DEFAULT_GROUP)]
    pub group: String,

    /// Extension treated as executable, repeatable ("+x" matches permission bits)
    #[arg(long = "ext", global = true, value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Seconds to wait for a single firewall call
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: u64,

    /// Only print results (-qq hides headers and summaries too)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub quiet: u8,

    /// Show firewall commands and other diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub no_banner: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create inbound and outbound block rules for executables under PATH
    #[command(alias = "b")]
    Block { path: PathBuf },
    /// Remove the block rules of executables under PATH
    #[command(alias = "u")]
    Unblock {
        path: PathBuf,
        /// Also remove rules created by other tools
        #[arg(long)]
        any_group: bool,
    },
    /// Remove owned rules whose executable no longer exists
    #[command(alias = "p")]
    Purge,
    /// Show owned rules and whether their executable still exists
    #[command(alias = "l")]
    List,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Resolves `path`, printing a notice when nothing matched.
pub fn resolve_targets(path: &Path, cfg: &Config) -> anyhow::Result<Vec<ExecutableTarget>> {
    let targets = PathResolver::from_config(cfg)
        .resolve(path)
        .context("cannot resolve target path")?;

    if targets.is_empty() {
        print::header("no executables found", cfg.quiet);
        print::no_results(cfg.quiet);
        print::print_status(format!(
            "Nothing under {} matches {}",
            path.display().to_string().color(colors::PATH),
            cfg.extensions.join(", ")
        ));
    }

    Ok(targets)
}

pub fn open_store(cfg: &Config) -> anyhow::Result<NetSecurityStore> {
    if !is_root::is_root() {
        warn!("Not running elevated, the firewall will refuse changes");
    }
    NetSecurityStore::connect(cfg.store_timeout).context("cannot reach the Windows firewall")
}

pub fn settings(path: Option<&Path>, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }

    print::set_key_width(["Target", "Group", "Extensions"]);
    if let Some(path) = path {
        print::aligned_line("Target", path.display().to_string().color(colors::PATH));
    }
    print::aligned_line("Group", cfg.group.as_str());
    print::aligned_line("Extensions", cfg.extensions.join(", "));
}

pub fn exit_status(outcomes: &[Outcome]) -> ExitCode {
    if outcomes.iter().any(Outcome::is_failure) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
