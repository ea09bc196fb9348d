// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{TimeZone, Utc};
use moneybag::db::{ACCOUNTS_KEY, SYNC_CONFIG_KEY, Store, TRANSACTIONS_KEY};
use moneybag::models::{Account, SyncConfig, Transaction, TransactionKind, default_accounts};
use rusqlite::params;
use rust_decimal::Decimal;
use tempfile::tempdir;

fn sample() -> Vec<Transaction> {
    let d = Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap();
    vec![
        Transaction::new("Salary", Decimal::new(5000, 0), TransactionKind::Income, "Salary", d, "cash"),
        Transaction::new("Tea", Decimal::new(1234, 2), TransactionKind::Expense, "Food", d, "cash")
            .with_counterparty("Rahim"),
        Transaction::transfer("ATM", Decimal::new(500, 0), d, "bank", "cash"),
    ]
}

#[test]
fn transactions_round_trip_field_for_field() {
    let store = Store::open_in_memory().unwrap();
    let txs = sample();
    store.save(TRANSACTIONS_KEY, &txs).unwrap();
    let loaded: Vec<Transaction> = store.load(TRANSACTIONS_KEY, Vec::new());
    assert_eq!(loaded, txs);
}

#[test]
fn absent_document_yields_default() {
    let store = Store::open_in_memory().unwrap();
    let accounts: Vec<Account> = store.load(ACCOUNTS_KEY, default_accounts());
    assert_eq!(accounts, default_accounts());
    let cfg: SyncConfig = store.load(SYNC_CONFIG_KEY, SyncConfig::default());
    assert!(!cfg.is_configured());
}

#[test]
fn corrupt_document_yields_default() {
    let store = Store::open_in_memory().unwrap();
    store
        .connection()
        .execute(
            "INSERT INTO documents(key, value) VALUES (?1, ?2)",
            params![TRANSACTIONS_KEY, "{not json"],
        )
        .unwrap();
    let loaded: Vec<Transaction> = store.load(TRANSACTIONS_KEY, Vec::new());
    assert!(loaded.is_empty());
}

#[test]
fn wrong_shape_yields_default() {
    let store = Store::open_in_memory().unwrap();
    store.save(ACCOUNTS_KEY, &vec!["just", "strings"]).unwrap();
    let accounts: Vec<Account> = store.load(ACCOUNTS_KEY, default_accounts());
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id, "cash");
}

#[test]
fn save_overwrites_previous_value() {
    let store = Store::open_in_memory().unwrap();
    store.save(TRANSACTIONS_KEY, &sample()).unwrap();
    store.save(TRANSACTIONS_KEY, &Vec::<Transaction>::new()).unwrap();
    let loaded: Vec<Transaction> = store.load(TRANSACTIONS_KEY, sample());
    assert!(loaded.is_empty());
}

#[test]
fn file_store_persists_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("moneybag.sqlite");
    let txs = sample();
    {
        let store = Store::open(&path).unwrap();
        store.save(TRANSACTIONS_KEY, &txs).unwrap();
    }
    let store = Store::open(&path).unwrap();
    let loaded: Vec<Transaction> = store.load(TRANSACTIONS_KEY, Vec::new());
    assert_eq!(loaded, txs);
}

#[test]
fn stored_json_uses_wire_field_names() {
    let store = Store::open_in_memory().unwrap();
    store.save(TRANSACTIONS_KEY, &sample()).unwrap();
    let raw: String = store
        .connection()
        .query_row(
            "SELECT value FROM documents WHERE key=?1",
            params![TRANSACTIONS_KEY],
            |r| r.get(0),
        )
        .unwrap();
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(v[0]["type"], "income");
    assert_eq!(v[0]["accountId"], "cash");
    assert_eq!(v[0]["amount"], 5000.0);
    assert!(v[0].get("targetAccountId").is_none());
    assert_eq!(v[2]["targetAccountId"], "cash");
    assert_eq!(v[1]["counterparty"], "Rahim");
}
