// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{Datelike, Utc};

use crate::ledger::{
    HistoryFilter, balances, by_category, by_day, history, monthly_summary, total_balance,
    yearly_breakdown, yearly_summary,
};
use crate::models::TransactionKind;
use crate::state::AppState;
use crate::sync::{Connectivity, Remote};
use crate::utils::{
    current_month, fmt_money, maybe_print_json, parse_month, parse_year, pretty_table,
};

pub fn handle<R: Remote, C: Connectivity>(
    state: &AppState<R, C>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("dashboard", sub)) => dashboard(state, sub)?,
        Some(("monthly", sub)) => monthly(state, sub)?,
        Some(("yearly", sub)) => yearly(state, sub)?,
        Some(("category", sub)) => category(state, sub)?,
        Some(("daily", sub)) => daily(state, sub)?,
        _ => {}
    }
    Ok(())
}

fn month_or_current(sub: &clap::ArgMatches) -> Result<String> {
    match sub.get_one::<String>("month") {
        Some(m) => parse_month(m),
        None => Ok(current_month()),
    }
}

fn dashboard<R: Remote, C: Connectivity>(
    state: &AppState<R, C>,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let month = month_or_current(sub)?;
    let txs = state.transactions();
    let summary = monthly_summary(txs, &month);
    let wallets = balances(txs, state.accounts());
    let total = total_balance(txs, state.accounts());
    let top = by_category(txs, Some(month.as_str()), TransactionKind::Expense);
    let recent = history(
        txs,
        &HistoryFilter {
            limit: Some(5),
            ..Default::default()
        },
    );

    if sub.get_flag("json") || sub.get_flag("jsonl") {
        let top5: Vec<_> = top.iter().take(5).collect();
        let v = serde_json::json!({
            "month": month,
            "total": total,
            "accounts": wallets,
            "summary": summary,
            "topCategories": top5,
            "recent": recent,
            "sync": state.status(),
        });
        maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &v)?;
        return Ok(());
    }

    println!("Total balance: {}", fmt_money(&total));
    let rows = wallets
        .iter()
        .map(|b| vec![b.name.clone(), fmt_money(&b.balance)])
        .collect();
    println!("{}", pretty_table(&["Account", "Balance"], rows));

    println!(
        "{}",
        pretty_table(
            &["Month", "Income", "Expense", "Net", "Withdrawals"],
            vec![vec![
                month.clone(),
                fmt_money(&summary.income),
                fmt_money(&summary.expense),
                fmt_money(&summary.net),
                fmt_money(&summary.withdrawals),
            ]],
        )
    );

    if !top.is_empty() {
        let rows = top
            .iter()
            .take(5)
            .map(|c| vec![c.category.clone(), fmt_money(&c.total), format!("{}%", c.share)])
            .collect();
        println!("{}", pretty_table(&["Top spending", "Amount", "Share"], rows));
    }

    if !recent.is_empty() {
        let rows = recent
            .iter()
            .map(|t| {
                vec![
                    t.day(),
                    t.flow().as_str().to_string(),
                    t.description.clone(),
                    fmt_money(&t.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Type", "Description", "Amount"], rows));
    }

    if state.sync_config().is_configured() {
        println!("Sync: {}", state.status());
    }
    Ok(())
}

fn monthly<R: Remote, C: Connectivity>(state: &AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_or_current(sub)?;
    let s = monthly_summary(state.transactions(), &month);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        println!(
            "{}",
            pretty_table(
                &["Month", "Income", "Expense", "Net", "Transfers", "Withdrawals", "Count"],
                vec![vec![
                    month,
                    fmt_money(&s.income),
                    fmt_money(&s.expense),
                    fmt_money(&s.net),
                    fmt_money(&s.transfers),
                    fmt_money(&s.withdrawals),
                    s.count.to_string(),
                ]],
            )
        );
    }
    Ok(())
}

fn yearly<R: Remote, C: Connectivity>(state: &AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let year = match sub.get_one::<String>("year") {
        Some(y) => parse_year(y)?,
        None => Utc::now().year(),
    };
    let data = yearly_breakdown(state.transactions(), year);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let mut rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.month.clone(),
                    fmt_money(&r.summary.income),
                    fmt_money(&r.summary.expense),
                    fmt_money(&r.summary.net),
                ]
            })
            .collect();
        let total = yearly_summary(state.transactions(), year);
        rows.push(vec![
            year.to_string(),
            fmt_money(&total.income),
            fmt_money(&total.expense),
            fmt_money(&total.net),
        ]);
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expense", "Net"], rows)
        );
    }
    Ok(())
}

fn category<R: Remote, C: Connectivity>(state: &AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_or_current(sub)?;
    let kind = match sub.get_one::<String>("type") {
        Some(t) => TransactionKind::parse(t)?,
        None => TransactionKind::Expense,
    };
    if kind == TransactionKind::Transfer {
        anyhow::bail!("Category report covers income or expense only");
    }
    let data = by_category(state.transactions(), Some(month.as_str()), kind);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    c.count.to_string(),
                    fmt_money(&c.total),
                    format!("{}%", c.share),
                ]
            })
            .collect();
        let hdr = format!("{} {}", kind, month);
        println!(
            "{}",
            pretty_table(&["Category", "Count", &hdr, "Share"], rows)
        );
    }
    Ok(())
}

fn daily<R: Remote, C: Connectivity>(state: &AppState<R, C>, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_or_current(sub)?;
    let cat = sub.get_one::<String>("category").map(|s| s.as_str());
    let data = by_day(state.transactions(), &month, cat);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|d| {
                vec![
                    d.day.clone(),
                    fmt_money(&d.income),
                    fmt_money(&d.expense),
                    d.count.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Day", "Income", "Expense", "Count"], rows)
        );
    }
    Ok(())
}
