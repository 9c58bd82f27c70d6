mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;

use basar_infra::{CashPointSession, FileStore, config};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    basar_observability::init(cli.log_format);

    let settings = config::load(cli.config.as_deref()).context("loading settings")?;
    let store = FileStore::new(&cli.data_dir);
    let mut session = CashPointSession::open(store, settings)
        .with_context(|| format!("opening data directory {}", cli.data_dir.display()))?;

    commands::run(&mut session, cli.command)
}
