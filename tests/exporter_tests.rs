// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use moneybag::db::Store;
use moneybag::models::{Transaction, TransactionKind};
use moneybag::state::AppState;
use moneybag::sync::{HttpRemote, StaticConnectivity};
use moneybag::{cli, commands::exporter};
use rust_decimal::Decimal;
use tempfile::tempdir;

fn seeded() -> AppState<HttpRemote, StaticConnectivity> {
    let store = Store::open_in_memory().unwrap();
    let remote = HttpRemote::new(Duration::from_secs(1)).unwrap();
    let mut state = AppState::load(store, remote, StaticConnectivity::new(false));
    state
        .add_transaction(
            Transaction::new(
                "Corner Shop",
                Decimal::new(1234, 2),
                TransactionKind::Expense,
                "Groceries",
                Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
                "cash",
            )
            .with_counterparty("Rina"),
        )
        .unwrap();
    state
        .add_transaction(Transaction::new(
            "Salary",
            Decimal::new(5000, 0),
            TransactionKind::Income,
            "Salary",
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            "cash",
        ))
        .unwrap();
    state
}

fn export(state: &AppState<HttpRemote, StaticConnectivity>, format: &str, out: &str) -> anyhow::Result<()> {
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "moneybag",
        "export",
        "transactions",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(state, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_transactions_csv_oldest_first() {
    let state = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    export(&state, "csv", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[1], "date");
    assert_eq!(&headers[8], "counterparty");
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][2], "income");
    assert_eq!(&rows[1][3], "Corner Shop");
    assert_eq!(&rows[1][5], "12.34");
    assert_eq!(&rows[1][6], "Cash");
    assert_eq!(&rows[1][8], "Rina");
}

#[test]
fn export_transactions_json_is_full_snapshot() {
    let state = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    export(&state, "JSON", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["transactions"].as_array().unwrap().len(), 2);
    assert_eq!(parsed["transactions"][0]["description"], "Corner Shop");
    assert_eq!(parsed["transactions"][0]["amount"], 12.34);
    assert_eq!(parsed["accounts"][0]["id"], "cash");
    assert!(parsed["toBuyList"].is_array());
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let state = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    assert!(export(&state, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}
