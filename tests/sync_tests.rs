// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use moneybag::models::{Account, Snapshot, Transaction, TransactionKind};
use moneybag::sync::{HttpRemote, Remote, decode_pull};
use rust_decimal::Decimal;
use serde_json::json;

/// Serves exactly one HTTP response and hands back the raw request it saw.
fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/exec", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let request = read_request(&mut stream);
        let resp = format!(
            "HTTP/1.1 {} Reply\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(resp.as_bytes()).unwrap();
        request
    });
    (url, handle)
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let len = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .map(|v| v.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn remote() -> HttpRemote {
    HttpRemote::new(Duration::from_secs(5)).unwrap()
}

fn snapshot() -> Snapshot {
    let d = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    Snapshot {
        transactions: vec![Transaction::new(
            "Rice",
            Decimal::new(450, 0),
            TransactionKind::Expense,
            "Bazar",
            d,
            "cash",
        )],
        accounts: vec![Account::cash()],
        templates: vec!["Rice".into()],
        to_buy_list: vec!["Oil".into()],
    }
}

#[test]
fn push_posts_plain_text_snapshot() {
    let (url, handle) = serve_once(200, r#"{"status":"ok"}"#);
    assert!(remote().push(&url, &snapshot()));
    let request = handle.join().unwrap();
    assert!(request.starts_with("POST /exec"));
    assert!(
        request
            .to_lowercase()
            .contains("content-type: text/plain;charset=utf-8")
    );
    let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
    let v: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(v["action"], "push");
    assert_eq!(v["transactions"][0]["description"], "Rice");
    assert_eq!(v["accounts"][0]["id"], "cash");
    assert_eq!(v["templates"], json!(["Rice"]));
    assert_eq!(v["toBuyList"], json!(["Oil"]));
    assert!(v["updatedAt"].is_string());
}

#[test]
fn push_treats_app_level_error_in_2xx_as_success() {
    let (url, handle) = serve_once(200, r#"{"status":"error","message":"sheet locked"}"#);
    assert!(remote().push(&url, &snapshot()));
    handle.join().unwrap();
}

#[test]
fn push_fails_on_non_2xx() {
    let (url, handle) = serve_once(500, "{}");
    assert!(!remote().push(&url, &snapshot()));
    handle.join().unwrap();
}

#[test]
fn push_fails_when_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/exec", listener.local_addr().unwrap());
    drop(listener);
    assert!(!remote().push(&url, &snapshot()));
    assert!(remote().pull(&url).is_none());
}

#[test]
fn push_times_out_instead_of_hanging() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/exec", listener.local_addr().unwrap());
    let _server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        thread::sleep(Duration::from_secs(3));
        drop(stream);
    });
    let quick = HttpRemote::new(Duration::from_millis(300)).unwrap();
    assert!(!quick.push(&url, &snapshot()));
}

#[test]
fn pull_sends_action_query_and_decodes() {
    let (url, handle) = serve_once(
        200,
        r#"{"transactions":[{"id":"t1","description":"Tea","amount":20,"type":"expense","category":"Food","date":"2025-01-05T10:00:00.000Z","accountId":"cash"}],"accounts":[{"id":"cash","name":"Cash","isDefault":true}],"templates":["Tea"],"updatedAt":"2025-01-05T10:00:01Z"}"#,
    );
    let pulled = remote().pull(&url).unwrap();
    let request = handle.join().unwrap();
    assert!(request.starts_with("GET /exec?action=pull"));

    assert_eq!(pulled.snapshot.transactions.len(), 1);
    assert_eq!(pulled.snapshot.transactions[0].amount, Decimal::new(20, 0));
    assert_eq!(pulled.snapshot.accounts[0].name, "Cash");
    assert_eq!(pulled.snapshot.templates, vec!["Tea".to_string()]);
    assert!(pulled.snapshot.to_buy_list.is_empty());
    assert_eq!(
        pulled.updated_at,
        Some(Utc.with_ymd_and_hms(2025, 1, 5, 10, 0, 1).unwrap())
    );
}

#[test]
fn pull_returns_none_on_non_2xx() {
    let (url, handle) = serve_once(404, "{}");
    assert!(remote().pull(&url).is_none());
    handle.join().unwrap();
}

#[test]
fn pull_returns_none_for_non_json() {
    let (url, handle) = serve_once(200, "<html>sign in</html>");
    assert!(remote().pull(&url).is_none());
    handle.join().unwrap();
}

#[test]
fn decode_requires_transactions_and_accounts() {
    assert!(decode_pull(json!({ "accounts": [] })).is_none());
    assert!(decode_pull(json!({ "transactions": [] })).is_none());
    assert!(decode_pull(json!({ "transactions": {}, "accounts": [] })).is_none());
    assert!(decode_pull(json!([1, 2])).is_none());
    let empty = decode_pull(json!({ "transactions": [], "accounts": [] })).unwrap();
    assert_eq!(empty.snapshot, Snapshot::default());
    assert!(empty.updated_at.is_none());
}

#[test]
fn decode_drops_malformed_records() {
    let body = json!({
        "transactions": [
            { "id": "ok", "description": "Bus", "amount": 30, "type": "expense",
              "category": "Travel", "date": "2025-03-01", "accountId": "cash" },
            { "id": "neg", "description": "x", "amount": -5, "type": "expense",
              "category": "c", "date": "2025-03-01", "accountId": "cash" },
            { "id": "notransfer", "description": "x", "amount": 5, "type": "transfer",
              "category": "c", "date": "2025-03-01", "accountId": "cash" },
            { "id": "badtype", "description": "x", "amount": 5, "type": "gift",
              "category": "c", "date": "2025-03-01", "accountId": "cash" },
            "garbage"
        ],
        "accounts": [
            { "id": "cash", "name": "Cash" },
            { "id": "", "name": "Blank" },
            { "name": "No id" }
        ],
        "templates": ["Rice", 42, null],
        "toBuyList": "not a list"
    });
    let pulled = decode_pull(body).unwrap();
    let ids: Vec<&str> = pulled
        .snapshot
        .transactions
        .iter()
        .map(|t| t.id.as_str())
        .collect();
    assert_eq!(ids, vec!["ok"]);
    assert_eq!(
        pulled.snapshot.transactions[0].date,
        Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(pulled.snapshot.accounts.len(), 1);
    assert_eq!(pulled.snapshot.templates, vec!["Rice".to_string()]);
    assert!(pulled.snapshot.to_buy_list.is_empty());
}
