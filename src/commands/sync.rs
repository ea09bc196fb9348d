// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use crate::error::AppError;
use crate::state::AppState;
use crate::sync::{Connectivity, Remote};
use crate::utils::{pretty_table, required};

pub fn handle<R: Remote, C: Connectivity>(
    state: &mut AppState<R, C>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("set-url", sub)) => {
            let url = required(sub, "url")?.trim();
            reqwest::Url::parse(url).map_err(|e| anyhow::anyhow!("Invalid URL '{}': {}", url, e))?;
            state.set_sync_url(url)?;
            println!("Sync endpoint set. Run `sync pull` to fetch existing data or `sync push` to upload.");
        }
        Some(("clear", _)) => {
            state.clear_sync()?;
            println!("Sync disabled");
        }
        Some(("status", _)) => status(state),
        Some(("push", sub)) => push(state, sub.get_flag("force"))?,
        Some(("pull", _)) => {
            state.pull(false)?;
            println!(
                "Pulled {} transactions, {} accounts",
                state.transactions().len(),
                state.accounts().len()
            );
        }
        _ => {}
    }
    Ok(())
}

fn status<R: Remote, C: Connectivity>(state: &AppState<R, C>) {
    let cfg = state.sync_config();
    let when = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.to_rfc3339()).unwrap_or_else(|| "never".into())
    };
    let rows = vec![
        vec![
            "Endpoint".to_string(),
            if cfg.is_configured() {
                cfg.url.clone()
            } else {
                "(not configured)".into()
            },
        ],
        vec!["Status".into(), state.status().to_string()],
        vec!["Last synced".into(), when(cfg.last_synced)],
        vec!["Last pulled".into(), when(cfg.last_pulled)],
        vec![
            "Pending push".into(),
            if cfg.pending { "yes" } else { "no" }.into(),
        ],
        vec![
            "Online".into(),
            if state.connectivity().is_online() { "yes" } else { "no" }.into(),
        ],
    ];
    println!("{}", pretty_table(&["Sync", ""], rows));
}

fn push<R: Remote, C: Connectivity>(state: &mut AppState<R, C>, force: bool) -> Result<()> {
    if !force {
        match state.remote_is_newer() {
            Ok(Some(remote_at)) => bail!(
                "Remote data was updated at {} after your last pull; run `sync pull` first or `sync push --force` to overwrite it",
                remote_at.to_rfc3339()
            ),
            Ok(None) => {}
            Err(AppError::PullFailed) => bail!(
                "Could not read the remote copy to check for newer data; `sync push --force` pushes without the check"
            ),
            Err(err) => return Err(err.into()),
        }
    }
    if state.push_now()? {
        println!("Pushed {} transactions", state.transactions().len());
    } else {
        bail!("Push failed; local data is unchanged (status: {})", state.status());
    }
    Ok(())
}
