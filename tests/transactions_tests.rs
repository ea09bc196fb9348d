// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use moneybag::db::Store;
use moneybag::models::{Account, Transaction, TransactionKind};
use moneybag::state::AppState;
use moneybag::sync::{HttpRemote, StaticConnectivity};
use moneybag::{cli, commands::transactions};
use rust_decimal::Decimal;

type State = AppState<HttpRemote, StaticConnectivity>;

fn setup() -> State {
    let store = Store::open_in_memory().unwrap();
    let remote = HttpRemote::new(Duration::from_secs(1)).unwrap();
    let mut state = AppState::load(store, remote, StaticConnectivity::new(false));
    let mut bank = Account::new("Bank");
    bank.id = "bank".into();
    state.add_account(bank).unwrap();
    for i in 1..=3 {
        let d = Utc.with_ymd_and_hms(2025, 1, i, 8, 0, 0).unwrap();
        state
            .add_transaction(Transaction::new(
                format!("Tea {}", i),
                Decimal::new(10, 0),
                TransactionKind::Expense,
                "Food",
                d,
                "cash",
            ))
            .unwrap();
    }
    state
}

fn run(state: &mut State, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["moneybag", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(state, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn list_limit_respected() {
    let state = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["moneybag", "tx", "list", "--limit", "2"]);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            let rows = transactions::query_rows(&state, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
            assert_eq!(rows[0].flow, "expense");
            assert_eq!(rows[0].account, "Cash");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no tx subcommand");
    }
}

#[test]
fn add_transfer_by_account_name() {
    let mut state = setup();
    run(
        &mut state,
        &[
            "add", "--amount", "250", "--account", "bank", "--to", "Cash", "--date", "2025-01-04",
        ],
    )
    .unwrap();

    let t = state
        .transactions()
        .iter()
        .find(|t| t.kind == TransactionKind::Transfer)
        .unwrap();
    assert_eq!(t.account_id, "bank");
    assert_eq!(t.target_account_id.as_deref(), Some("cash"));
    assert_eq!(t.amount, Decimal::new(250, 0));
    assert_eq!(t.category, "Transfer");

    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["moneybag", "tx", "list", "--account", "Bank"]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&state, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].flow, "withdrawal");
    assert_eq!(rows[0].account, "Bank -> Cash");
}

#[test]
fn add_rejects_bad_input() {
    let mut state = setup();
    assert!(run(&mut state, &["add", "--amount", "0"]).is_err());
    assert!(run(&mut state, &["add", "--amount", "abc"]).is_err());
    assert!(run(&mut state, &["add", "--amount", "5", "--type", "transfer"]).is_err());
    assert!(run(&mut state, &["add", "--amount", "5", "--to", "bank", "--type", "income"]).is_err());
    assert!(run(&mut state, &["add", "--amount", "5", "--account", "nowhere"]).is_err());
    assert_eq!(state.transactions().len(), 3);
}

#[test]
fn edit_and_remove_by_prefix() {
    let mut state = setup();
    let id = state.transactions()[0].id.clone();
    let prefix = &id[..8];

    run(&mut state, &["edit", "--id", prefix, "--amount", "42.5", "--category", "Snacks"]).unwrap();
    let t = state.transaction(&id).unwrap();
    assert_eq!(t.amount, Decimal::new(425, 1));
    assert_eq!(t.category, "Snacks");
    assert_eq!(t.description, "Tea 1");

    run(&mut state, &["rm", "--id", prefix]).unwrap();
    assert!(state.transaction(&id).is_none());
    assert_eq!(state.transactions().len(), 2);
    assert!(run(&mut state, &["rm", "--id", "does-not-exist"]).is_err());
}

#[test]
fn list_filters_by_search_and_type() {
    let mut state = setup();
    run(
        &mut state,
        &["add", "--amount", "900", "--type", "income", "--description", "Bonus", "--date", "2025-01-05"],
    )
    .unwrap();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["moneybag", "tx", "list", "--type", "income"]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&state, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].description, "Bonus");
    assert_eq!(rows[0].category, "Salary");

    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["moneybag", "tx", "list", "--search", "tea 2"]);
    let (_, tx_m) = matches.subcommand().unwrap();
    let (_, list_m) = tx_m.subcommand().unwrap();
    let rows = transactions::query_rows(&state, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "2025-01-02");
}
