// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;

use crate::commands::{print_sync_status, resolve_account};
use crate::ledger::{HistoryFilter, account_name, history};
use crate::models::{Transaction, TransactionKind};
use crate::state::AppState;
use crate::sync::{Connectivity, Remote};
use crate::utils::{
    fmt_money, maybe_print_json, parse_amount, parse_date, parse_month, pretty_table, required,
};

pub fn handle<R: Remote, C: Connectivity>(
    state: &mut AppState<R, C>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(state, sub)?,
        Some(("edit", sub)) => edit(state, sub)?,
        Some(("rm", sub)) => remove(state, sub)?,
        Some(("list", sub)) => list(state, sub)?,
        _ => {}
    }
    Ok(())
}

fn default_category(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Salary",
        TransactionKind::Expense => "General",
        TransactionKind::Transfer => "Transfer",
    }
}

fn add<R: Remote, C: Connectivity>(state: &mut AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_amount(required(sub, "amount")?)?;
    let target = sub.get_one::<String>("to");
    let kind = match sub.get_one::<String>("type") {
        Some(t) => TransactionKind::parse(t)?,
        None if target.is_some() => TransactionKind::Transfer,
        None => TransactionKind::Expense,
    };
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => Utc::now(),
    };
    let account_id = resolve_account(state, sub.get_one::<String>("account"))?;
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| default_category(kind).to_string());
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    let mut tx = Transaction::new(description, amount, kind, category, date, account_id);
    match (kind, target) {
        (TransactionKind::Transfer, Some(to)) => {
            tx.target_account_id = Some(resolve_account(state, Some(to))?);
        }
        (TransactionKind::Transfer, None) => bail!("Transfers need --to <account>"),
        (_, Some(_)) => bail!("--to only applies to transfers"),
        (_, None) => {}
    }
    tx.counterparty = sub
        .get_one::<String>("counterparty")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let summary = format!(
        "{} {} in '{}' ({})",
        kind,
        fmt_money(&tx.amount),
        tx.category,
        account_name(state.accounts(), &tx.account_id)
    );
    let id = state.add_transaction(tx)?;
    println!("Recorded {} [{}]", summary, short_id(&id));
    print_sync_status(state);
    Ok(())
}

fn edit<R: Remote, C: Connectivity>(state: &mut AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let id = resolve_tx_id(state, required(sub, "id")?)?;
    let mut tx = state
        .transaction(&id)
        .cloned()
        .with_context(|| format!("Transaction '{}' not found", id))?;

    if let Some(a) = sub.get_one::<String>("amount") {
        tx.amount = parse_amount(a)?;
    }
    if let Some(t) = sub.get_one::<String>("type") {
        tx.kind = TransactionKind::parse(t)?;
        if tx.kind != TransactionKind::Transfer {
            tx.target_account_id = None;
        }
    }
    if let Some(c) = sub.get_one::<String>("category") {
        tx.category = c.trim().to_string();
    }
    if let Some(d) = sub.get_one::<String>("description") {
        tx.description = d.trim().to_string();
    }
    if let Some(d) = sub.get_one::<String>("date") {
        tx.date = parse_date(d)?;
    }
    if let Some(a) = sub.get_one::<String>("account") {
        tx.account_id = resolve_account(state, Some(a))?;
    }
    if let Some(to) = sub.get_one::<String>("to") {
        tx.target_account_id = Some(resolve_account(state, Some(to))?);
    }
    if let Some(p) = sub.get_one::<String>("counterparty") {
        let p = p.trim();
        tx.counterparty = (!p.is_empty()).then(|| p.to_string());
    }

    state.update_transaction(tx)?;
    println!("Updated transaction [{}]", short_id(&id));
    print_sync_status(state);
    Ok(())
}

fn remove<R: Remote, C: Connectivity>(state: &mut AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let id = resolve_tx_id(state, required(sub, "id")?)?;
    state.delete_transaction(&id)?;
    println!("Removed transaction [{}]", short_id(&id));
    print_sync_status(state);
    Ok(())
}

/// Exact id, or a prefix matching exactly one transaction.
pub fn resolve_tx_id<R: Remote, C: Connectivity>(state: &AppState<R, C>, key: &str) -> Result<String> {
    let key = key.trim();
    if state.transaction(key).is_some() {
        return Ok(key.to_string());
    }
    let matches: Vec<&Transaction> = state
        .transactions()
        .iter()
        .filter(|t| t.id.starts_with(key))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.id.clone()),
        [] => bail!("Transaction '{}' not found", key),
        _ => bail!("Id prefix '{}' is ambiguous ({} matches)", key, matches.len()),
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

fn list<R: Remote, C: Connectivity>(state: &AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(state, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    short_id(&r.id).to_string(),
                    r.date.clone(),
                    r.flow.clone(),
                    r.description.clone(),
                    r.category.clone(),
                    r.account.clone(),
                    r.amount.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Type", "Description", "Category", "Account", "Amount"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub flow: String,
    pub description: String,
    pub category: String,
    pub account: String,
    pub amount: String,
    pub counterparty: String,
}

pub fn query_rows<R: Remote, C: Connectivity>(
    state: &AppState<R, C>,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let mut filter = HistoryFilter {
        limit: sub.get_one::<usize>("limit").copied(),
        search: sub.get_one::<String>("search").cloned(),
        category: sub.get_one::<String>("category").cloned(),
        ..Default::default()
    };
    if let Some(month) = sub.get_one::<String>("month") {
        filter.month = Some(parse_month(month)?);
    }
    if let Some(acct) = sub.get_one::<String>("account") {
        // unknown names fall through as raw ids so orphaned references stay searchable
        filter.account_id = Some(
            state
                .find_account(acct)
                .map(|a| a.id.clone())
                .unwrap_or_else(|| acct.trim().to_string()),
        );
    }
    if let Some(t) = sub.get_one::<String>("type") {
        filter.kind = Some(TransactionKind::parse(t)?);
    }

    let accounts = state.accounts();
    Ok(history(state.transactions(), &filter)
        .into_iter()
        .map(|t| {
            let account = match t.target_account_id.as_deref() {
                Some(to) => format!(
                    "{} -> {}",
                    account_name(accounts, &t.account_id),
                    account_name(accounts, to)
                ),
                None => account_name(accounts, &t.account_id).to_string(),
            };
            TransactionRow {
                id: t.id.clone(),
                date: t.day(),
                flow: t.flow().as_str().to_string(),
                description: t.description.clone(),
                category: t.category.clone(),
                account,
                amount: fmt_money(&t.amount),
                counterparty: t.counterparty.clone().unwrap_or_default(),
            }
        })
        .collect())
}
