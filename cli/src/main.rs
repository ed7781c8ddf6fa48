mod commands;
mod terminal;

use std::process::ExitCode;
use std::time::Duration;

use commands::{CommandLine, Commands, block, list, purge, unblock};
use progwall_common::config::{Config, UnblockScope};
use terminal::{logging, print};
use tracing::error;

fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet, commands.verbose);

    let unblock_scope = match commands.command {
        Commands::Unblock { any_group: true, .. } => UnblockScope::AnyGroup,
        _ => UnblockScope::Owned,
    };

    let cfg = Config {
        group: commands.group,
        store_timeout: Duration::from_secs(commands.timeout),
        unblock_scope,
        quiet: commands.quiet,
        verbose: commands.verbose,
        no_banner: commands.no_banner,
        ..Config::default()
    }
    .with_extensions(&commands.extensions);

    print::banner(cfg.no_banner, cfg.quiet);

    let result = match &commands.command {
        Commands::Block { path } => block::block(path, &cfg),
        Commands::Unblock { path, .. } => unblock::unblock(path, &cfg),
        Commands::Purge => purge::purge(&cfg),
        Commands::List => list::list(&cfg),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
