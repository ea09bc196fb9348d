// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::Utc;

use crate::commands::{print_sync_status, resolve_account};
use crate::ledger::lending_ledger;
use crate::models::{Transaction, TransactionKind};
use crate::state::AppState;
use crate::sync::{Connectivity, Remote};
use crate::utils::{fmt_money, maybe_print_json, parse_amount, parse_date, pretty_table, required};

pub const LENDING_CATEGORY: &str = "Lending";

pub fn handle<R: Remote, C: Connectivity>(
    state: &mut AppState<R, C>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(state, sub)?,
        Some(("give", sub)) => record(state, sub, TransactionKind::Expense, "to")?,
        Some(("receive", sub)) => record(state, sub, TransactionKind::Income, "from")?,
        _ => {}
    }
    Ok(())
}

fn list<R: Remote, C: Connectivity>(state: &AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let data = lending_ledger(state.transactions());
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|e| {
                vec![
                    e.counterparty.clone(),
                    fmt_money(&e.given),
                    fmt_money(&e.received),
                    fmt_money(&e.outstanding),
                    e.last_activity.format("%Y-%m-%d").to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Person", "Given", "Received", "Outstanding", "Last"],
                rows
            )
        );
    }
    Ok(())
}

/// Loans are plain income/expense rows tagged with a counterparty.
fn record<R: Remote, C: Connectivity>(
    state: &mut AppState<R, C>,
    sub: &clap::ArgMatches,
    kind: TransactionKind,
    who_arg: &str,
) -> Result<()> {
    let person = required(sub, who_arg)?.trim().to_string();
    let amount = parse_amount(required(sub, "amount")?)?;
    let account_id = resolve_account(state, sub.get_one::<String>("account"))?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Utc::now(),
    };
    let description = match sub.get_one::<String>("description") {
        Some(d) => d.trim().to_string(),
        None if kind == TransactionKind::Expense => format!("Lent to {}", person),
        None => format!("Returned by {}", person),
    };
    let tx = Transaction::new(description, amount, kind, LENDING_CATEGORY, date, account_id)
        .with_counterparty(&person);
    state.add_transaction(tx)?;
    let outstanding = lending_ledger(state.transactions())
        .into_iter()
        .find(|e| e.counterparty.eq_ignore_ascii_case(&person))
        .map(|e| e.outstanding)
        .unwrap_or_default();
    println!(
        "Recorded {} {} {}; outstanding {}",
        if kind == TransactionKind::Expense { "loan of" } else { "repayment of" },
        fmt_money(&amount),
        person,
        fmt_money(&outstanding)
    );
    print_sync_status(state);
    Ok(())
}
