// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Figures derived from the transaction list. Nothing here is persisted;
//! every number is recomputed on read.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Account, Flow, Transaction, TransactionKind, UNKNOWN_ACCOUNT};

/// Effect of `tx` on `account_id`, signed.
pub fn signed_amount(tx: &Transaction, account_id: &str) -> Decimal {
    let mut delta = Decimal::ZERO;
    match tx.kind {
        TransactionKind::Income if tx.account_id == account_id => delta += tx.amount,
        TransactionKind::Expense if tx.account_id == account_id => delta -= tx.amount,
        TransactionKind::Transfer => {
            if tx.account_id == account_id {
                delta -= tx.amount;
            }
            if tx.target_account_id.as_deref() == Some(account_id) {
                delta += tx.amount;
            }
        }
        _ => {}
    }
    delta
}

pub fn balance(txs: &[Transaction], account_id: &str) -> Decimal {
    txs.iter().map(|t| signed_amount(t, account_id)).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub id: String,
    pub name: String,
    pub balance: Decimal,
    pub is_default: bool,
}

pub fn balances(txs: &[Transaction], accounts: &[Account]) -> Vec<AccountBalance> {
    accounts
        .iter()
        .map(|a| AccountBalance {
            id: a.id.clone(),
            name: a.name.clone(),
            balance: balance(txs, &a.id),
            is_default: a.is_default(),
        })
        .collect()
}

/// Balances of account ids referenced by transactions but no longer defined.
pub fn orphan_balances(txs: &[Transaction], accounts: &[Account]) -> Vec<AccountBalance> {
    let mut ids: Vec<&str> = Vec::new();
    for tx in txs {
        for id in std::iter::once(tx.account_id.as_str()).chain(tx.target_account_id.as_deref()) {
            if !accounts.iter().any(|a| a.id == id) && !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids.into_iter()
        .map(|id| AccountBalance {
            id: id.to_string(),
            name: UNKNOWN_ACCOUNT.to_string(),
            balance: balance(txs, id),
            is_default: false,
        })
        .collect()
}

pub fn total_balance(txs: &[Transaction], accounts: &[Account]) -> Decimal {
    accounts.iter().map(|a| balance(txs, &a.id)).sum()
}

pub fn account_name<'a>(accounts: &'a [Account], id: &str) -> &'a str {
    accounts
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.name.as_str())
        .unwrap_or(UNKNOWN_ACCOUNT)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub transfers: Decimal,
    pub withdrawals: Decimal,
    pub count: usize,
}

pub fn summarize<'a>(txs: impl IntoIterator<Item = &'a Transaction>) -> Summary {
    let mut s = Summary::default();
    for tx in txs {
        s.count += 1;
        match tx.flow() {
            Flow::Income => s.income += tx.amount,
            Flow::Expense => s.expense += tx.amount,
            Flow::Transfer => s.transfers += tx.amount,
            Flow::Withdrawal => s.withdrawals += tx.amount,
        }
    }
    s.net = s.income - s.expense;
    s
}

pub fn monthly_summary(txs: &[Transaction], month: &str) -> Summary {
    summarize(txs.iter().filter(|t| t.month() == month))
}

pub fn yearly_summary(txs: &[Transaction], year: i32) -> Summary {
    summarize(txs.iter().filter(|t| t.date.year() == year))
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthRow {
    pub month: String,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Twelve rows, January first, empty months included.
pub fn yearly_breakdown(txs: &[Transaction], year: i32) -> Vec<MonthRow> {
    (1..=12)
        .map(|m| {
            let month = format!("{:04}-{:02}", year, m);
            let summary = monthly_summary(txs, &month);
            MonthRow { month, summary }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: usize,
    /// Percent of the period total for this kind.
    pub share: Decimal,
}

/// Income or expense totals per category, largest first.
pub fn by_category(
    txs: &[Transaction],
    month: Option<&str>,
    kind: TransactionKind,
) -> Vec<CategoryTotal> {
    let mut agg: HashMap<&str, (Decimal, usize)> = HashMap::new();
    for tx in txs
        .iter()
        .filter(|t| t.kind == kind)
        .filter(|t| month.is_none_or(|m| t.month() == m))
    {
        let entry = agg.entry(tx.category.as_str()).or_insert((Decimal::ZERO, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }
    let grand: Decimal = agg.values().map(|(d, _)| *d).sum();
    let mut items: Vec<CategoryTotal> = agg
        .into_iter()
        .map(|(cat, (total, count))| CategoryTotal {
            category: if cat.trim().is_empty() {
                "(uncategorized)".to_string()
            } else {
                cat.to_string()
            },
            total,
            count,
            share: if grand.is_zero() {
                Decimal::ZERO
            } else {
                (total * Decimal::ONE_HUNDRED / grand).round_dp(1)
            },
        })
        .collect();
    items.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));
    items
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotal {
    pub day: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub count: usize,
}

/// Per-day drill-down of a month, latest day first.
pub fn by_day(txs: &[Transaction], month: &str, category: Option<&str>) -> Vec<DayTotal> {
    let mut agg: BTreeMap<String, DayTotal> = BTreeMap::new();
    for tx in txs
        .iter()
        .filter(|t| t.month() == month)
        .filter(|t| category.is_none_or(|c| t.category.eq_ignore_ascii_case(c)))
    {
        let day = tx.day();
        let entry = agg.entry(day.clone()).or_insert_with(|| DayTotal {
            day,
            income: Decimal::ZERO,
            expense: Decimal::ZERO,
            count: 0,
        });
        match tx.kind {
            TransactionKind::Income => entry.income += tx.amount,
            TransactionKind::Expense => entry.expense += tx.amount,
            TransactionKind::Transfer => {}
        }
        entry.count += 1;
    }
    agg.into_values().rev().collect()
}

#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub month: Option<String>,
    /// Matches either side of a transfer.
    pub account_id: Option<String>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub limit: Option<usize>,
}

/// Newest first.
pub fn history<'a>(txs: &'a [Transaction], f: &HistoryFilter) -> Vec<&'a Transaction> {
    let needle = f.search.as_ref().map(|s| s.to_lowercase());
    let mut out: Vec<&Transaction> = txs
        .iter()
        .filter(|t| f.month.as_deref().is_none_or(|m| t.month() == m))
        .filter(|t| f.account_id.as_deref().is_none_or(|a| t.touches(a)))
        .filter(|t| f.kind.is_none_or(|k| t.kind == k))
        .filter(|t| {
            f.category
                .as_deref()
                .is_none_or(|c| t.category.eq_ignore_ascii_case(c))
        })
        .filter(|t| {
            needle.as_deref().is_none_or(|n| {
                t.description.to_lowercase().contains(n)
                    || t.category.to_lowercase().contains(n)
                    || t
                        .counterparty
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(n))
            })
        })
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = f.limit {
        out.truncate(limit);
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LendingEntry {
    pub counterparty: String,
    pub given: Decimal,
    pub received: Decimal,
    /// Positive: they owe us. Negative: we owe them.
    pub outstanding: Decimal,
    pub last_activity: DateTime<Utc>,
}

/// Per-person loan ledger built from the `counterparty` field.
pub fn lending_ledger(txs: &[Transaction]) -> Vec<LendingEntry> {
    let mut agg: HashMap<String, LendingEntry> = HashMap::new();
    for tx in txs {
        let Some(name) = tx.counterparty.as_deref().map(str::trim) else {
            continue;
        };
        if name.is_empty() || tx.kind == TransactionKind::Transfer {
            continue;
        }
        let entry = agg
            .entry(name.to_lowercase())
            .or_insert_with(|| LendingEntry {
                counterparty: name.to_string(),
                given: Decimal::ZERO,
                received: Decimal::ZERO,
                outstanding: Decimal::ZERO,
                last_activity: tx.date,
            });
        match tx.kind {
            TransactionKind::Expense => entry.given += tx.amount,
            TransactionKind::Income => entry.received += tx.amount,
            TransactionKind::Transfer => {}
        }
        entry.outstanding = entry.given - entry.received;
        if tx.date > entry.last_activity {
            entry.last_activity = tx.date;
        }
    }
    let mut items: Vec<LendingEntry> = agg.into_values().collect();
    items.sort_by(|a, b| {
        b.outstanding
            .cmp(&a.outstanding)
            .then(a.counterparty.cmp(&b.counterparty))
    });
    items
}
