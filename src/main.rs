// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use moneybag::db::{self, Store};
use moneybag::state::AppState;
use moneybag::sync::{HttpRemote, StaticConnectivity};
use moneybag::{cli, commands, config};

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MONEYBAG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let cfg = config::load(&matches).context("Failed to load configuration")?;
    let path = db::db_path(cfg.data_dir.as_deref())?;
    let store = Store::open(&path).with_context(|| format!("Open store at {}", path.display()))?;
    let remote = HttpRemote::new(Duration::from_secs(cfg.timeout_secs))?;
    let connectivity = StaticConnectivity::new(!cfg.offline);
    let mut state = AppState::load(store, remote, connectivity);

    // A push deferred by an earlier offline run goes out first.
    if let Err(err) = state.flush_pending() {
        warn!(error = %err, "could not flush deferred push");
    }

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Store initialized at {}", path.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&mut state, sub)?,
        Some(("account", sub)) => commands::accounts::handle(&mut state, sub)?,
        Some(("report", sub)) => commands::reports::handle(&state, sub)?,
        Some(("lend", sub)) => commands::lending::handle(&mut state, sub)?,
        Some(("bazar", sub)) => commands::shopping::handle_bazar(&mut state, sub)?,
        Some(("tobuy", sub)) => commands::shopping::handle_to_buy(&mut state, sub)?,
        Some(("sync", sub)) => commands::sync::handle(&mut state, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&state, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
