// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Id of the conventional physical-cash account.
pub const CASH_ACCOUNT_ID: &str = "cash";

/// Shown wherever a transaction points at an account that no longer exists.
pub const UNKNOWN_ACCOUNT: &str = "Unknown account";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(AppError::Invalid(format!(
                "unknown transaction type '{}' (use income|expense|transfer)",
                other
            ))),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting classification. A withdrawal is a transfer into the cash account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Income,
    Expense,
    Transfer,
    Withdrawal,
}

impl Flow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::Withdrawal => "withdrawal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub category: String,
    #[serde(with = "iso_date")]
    pub date: DateTime<Utc>,
    pub account_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_account_id: Option<String>,
    /// Person on the other side of a loan: expenses lend to them, incomes are repayments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterparty: Option<String>,
}

impl Transaction {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        kind: TransactionKind,
        category: impl Into<String>,
        date: DateTime<Utc>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            id: new_id(),
            description: description.into(),
            amount,
            kind,
            category: category.into(),
            date,
            account_id: account_id.into(),
            target_account_id: None,
            counterparty: None,
        }
    }

    pub fn transfer(
        description: impl Into<String>,
        amount: Decimal,
        date: DateTime<Utc>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        let mut tx = Self::new(
            description,
            amount,
            TransactionKind::Transfer,
            "Transfer",
            date,
            from,
        );
        tx.target_account_id = Some(to.into());
        tx
    }

    pub fn with_counterparty(mut self, name: impl Into<String>) -> Self {
        self.counterparty = Some(name.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(AppError::Invalid("id must not be empty".into()));
        }
        if self.amount <= Decimal::ZERO {
            return Err(AppError::Invalid(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        match (self.kind, self.target_account_id.as_deref()) {
            (TransactionKind::Transfer, None) => Err(AppError::Invalid(
                "transfers need a target account".into(),
            )),
            (TransactionKind::Transfer, Some(target)) if target == self.account_id => Err(
                AppError::Invalid("transfer source and target must differ".into()),
            ),
            (TransactionKind::Income | TransactionKind::Expense, Some(_)) => Err(
                AppError::Invalid("only transfers may have a target account".into()),
            ),
            _ => Ok(()),
        }
    }

    pub fn flow(&self) -> Flow {
        match self.kind {
            TransactionKind::Income => Flow::Income,
            TransactionKind::Expense => Flow::Expense,
            TransactionKind::Transfer
                if self.target_account_id.as_deref() == Some(CASH_ACCOUNT_ID) =>
            {
                Flow::Withdrawal
            }
            TransactionKind::Transfer => Flow::Transfer,
        }
    }

    /// `YYYY-MM` of the transaction date.
    pub fn month(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    pub fn day(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn touches(&self, account_id: &str) -> bool {
        self.account_id == account_id || self.target_account_id.as_deref() == Some(account_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            color: None,
            is_default: None,
        }
    }

    pub fn cash() -> Self {
        Self {
            id: CASH_ACCOUNT_ID.to_string(),
            name: "Cash".to_string(),
            color: None,
            is_default: Some(true),
        }
    }

    pub fn is_default(&self) -> bool {
        self.is_default.unwrap_or(false)
    }
}

pub fn default_accounts() -> Vec<Account> {
    vec![Account::cash()]
}

/// Everything exchanged wholesale with the sync endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub templates: Vec<String>,
    #[serde(default)]
    pub to_buy_list: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_pulled: Option<DateTime<Utc>>,
    /// An auto-push was deferred while offline.
    #[serde(default)]
    pub pending: bool,
}

impl SyncConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    None,
    Syncing,
    Synced,
    Error,
    Pending,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "none",
            Self::Syncing => "syncing",
            Self::Synced => "synced",
            Self::Error => "error",
            Self::Pending => "pending",
        };
        f.write_str(s)
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// RFC 3339 on the way out; RFC 3339 or a bare `YYYY-MM-DD` on the way in.
pub mod iso_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid date '{}'", raw)))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }
}
