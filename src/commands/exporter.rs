// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};

use crate::ledger::account_name;
use crate::state::AppState;
use crate::sync::{Connectivity, Remote};
use crate::utils::required;

pub fn handle<R: Remote, C: Connectivity>(
    state: &AppState<R, C>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(state, sub),
        _ => Ok(()),
    }
}

fn export_transactions<R: Remote, C: Connectivity>(
    state: &AppState<R, C>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let fmt = required(sub, "format")?.to_lowercase();
    let out = required(sub, "out")?;

    let mut txs: Vec<_> = state.transactions().iter().collect();
    txs.sort_by(|a, b| a.date.cmp(&b.date));
    let accounts = state.accounts();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id", "date", "type", "description", "category", "amount", "account", "target",
                "counterparty",
            ])?;
            for t in txs {
                wtr.write_record([
                    t.id.clone(),
                    t.date.to_rfc3339(),
                    t.kind.to_string(),
                    t.description.clone(),
                    t.category.clone(),
                    t.amount.to_string(),
                    account_name(accounts, &t.account_id).to_string(),
                    t.target_account_id
                        .as_deref()
                        .map(|id| account_name(accounts, id).to_string())
                        .unwrap_or_default(),
                    t.counterparty.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(state.snapshot())?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported transactions to {}", out);
    Ok(())
}
