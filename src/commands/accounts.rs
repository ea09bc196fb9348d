// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{print_sync_status, resolve_account};
use crate::ledger::{balances, orphan_balances, total_balance};
use crate::models::Account;
use crate::state::AppState;
use crate::sync::{Connectivity, Remote};
use crate::utils::{fmt_money, maybe_print_json, pretty_table, required};
use anyhow::Result;

pub fn handle<R: Remote, C: Connectivity>(
    state: &mut AppState<R, C>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = required(sub, "name")?.trim().to_string();
            let mut account = Account::new(&name);
            account.color = sub.get_one::<String>("color").cloned();
            if sub.get_flag("default") {
                account.is_default = Some(true);
            }
            state.add_account(account)?;
            println!("Added account '{}'", name);
            print_sync_status(state);
        }
        Some(("list", sub)) => {
            let json_flag = sub.get_flag("json");
            let jsonl_flag = sub.get_flag("jsonl");
            let mut data = balances(state.transactions(), state.accounts());
            data.extend(orphan_balances(state.transactions(), state.accounts()));
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let mut rows: Vec<Vec<String>> = data
                    .iter()
                    .map(|b| {
                        vec![
                            b.name.clone(),
                            b.id.clone(),
                            if b.is_default { "*".into() } else { String::new() },
                            fmt_money(&b.balance),
                        ]
                    })
                    .collect();
                rows.push(vec![
                    "Total".into(),
                    String::new(),
                    String::new(),
                    fmt_money(&total_balance(state.transactions(), state.accounts())),
                ]);
                println!(
                    "{}",
                    pretty_table(&["Account", "Id", "Default", "Balance"], rows)
                );
            }
        }
        Some(("rename", sub)) => {
            let id = resolve_account(state, Some(required(sub, "account")?))?;
            let name = required(sub, "name")?;
            state.rename_account(&id, name)?;
            println!("Renamed account to '{}'", name.trim());
            print_sync_status(state);
        }
        Some(("default", sub)) => {
            let id = resolve_account(state, Some(required(sub, "account")?))?;
            state.set_default_account(&id)?;
            println!("Default account is now '{}'", state.default_account().name);
            print_sync_status(state);
        }
        Some(("rm", sub)) => {
            let key = required(sub, "account")?;
            let id = resolve_account(state, Some(key))?;
            state.delete_account(&id)?;
            println!("Removed account '{}'", key);
            print_sync_status(state);
        }
        _ => {}
    }
    Ok(())
}
