// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Snapshot exchange with a user-hosted spreadsheet script.
//!
//! The endpoint stores one document. A push overwrites it with the full local
//! snapshot and a pull returns it whole, so there is no merge step anywhere.

use std::cell::Cell;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Account, Snapshot, Transaction, iso_date};
use crate::utils::http_client;

/// Sent as plain text so browser-hosted scripts accept it without a preflight.
const PUSH_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
pub struct Pulled {
    pub snapshot: Snapshot,
    /// Stamp written by the last push from any device, if the endpoint kept it.
    pub updated_at: Option<DateTime<Utc>>,
}

pub trait Remote {
    /// `true` when the endpoint accepted the snapshot.
    fn push(&self, url: &str, snapshot: &Snapshot) -> bool;
    /// `None` when unreachable, non-2xx, or missing `transactions`/`accounts`.
    fn pull(&self, url: &str) -> Option<Pulled>;
}

pub trait Connectivity {
    fn is_online(&self) -> bool;
}

/// Connectivity decided by configuration, flippable at runtime.
#[derive(Debug)]
pub struct StaticConnectivity {
    online: Cell<bool>,
}

impl StaticConnectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: Cell::new(online),
        }
    }

    pub fn set(&self, online: bool) {
        self.online.set(online);
    }
}

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.online.get()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PushBody<'a> {
    action: &'static str,
    #[serde(flatten)]
    snapshot: &'a Snapshot,
    #[serde(with = "iso_date")]
    updated_at: DateTime<Utc>,
}

pub struct HttpRemote {
    client: reqwest::blocking::Client,
}

impl HttpRemote {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
        })
    }
}

impl Remote for HttpRemote {
    fn push(&self, url: &str, snapshot: &Snapshot) -> bool {
        let body = PushBody {
            action: "push",
            snapshot,
            updated_at: Utc::now(),
        };
        let payload = match serde_json::to_string(&body) {
            Ok(p) => p,
            Err(err) => {
                warn!(error = %err, "failed to encode push body");
                return false;
            }
        };
        debug!(url, bytes = payload.len(), "pushing snapshot");
        match self
            .client
            .post(url)
            .header(CONTENT_TYPE, PUSH_CONTENT_TYPE)
            .body(payload)
            .send()
        {
            Ok(resp) if resp.status().is_success() => {
                info!(
                    transactions = snapshot.transactions.len(),
                    accounts = snapshot.accounts.len(),
                    "snapshot pushed"
                );
                true
            }
            Ok(resp) => {
                warn!(status = %resp.status(), "push rejected by endpoint");
                false
            }
            Err(err) => {
                warn!(error = %err, "push failed");
                false
            }
        }
    }

    fn pull(&self, url: &str) -> Option<Pulled> {
        let resp = match self.client.get(url).query(&[("action", "pull")]).send() {
            Ok(resp) => resp,
            Err(err) => {
                warn!(error = %err, "pull failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            warn!(status = %resp.status(), "pull rejected by endpoint");
            return None;
        }
        let body: Value = match resp.json() {
            Ok(v) => v,
            Err(err) => {
                warn!(error = %err, "pull returned a non-JSON body");
                return None;
            }
        };
        decode_pull(body)
    }
}

/// Checks the top-level shape, then keeps every record that decodes and
/// satisfies the model invariants. Bad records are dropped, not fatal.
pub fn decode_pull(body: Value) -> Option<Pulled> {
    let Value::Object(mut obj) = body else {
        warn!("pull body is not an object");
        return None;
    };
    let (Some(Value::Array(raw_txs)), Some(Value::Array(raw_accounts))) =
        (obj.remove("transactions"), obj.remove("accounts"))
    else {
        warn!("pull body lacks transactions or accounts");
        return None;
    };

    let transactions: Vec<Transaction> = raw_txs
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<Transaction>(v) {
            Ok(tx) => match tx.validate() {
                Ok(()) => Some(tx),
                Err(err) => {
                    warn!(id = %tx.id, error = %err, "dropping invalid remote transaction");
                    None
                }
            },
            Err(err) => {
                warn!(error = %err, "dropping undecodable remote transaction");
                None
            }
        })
        .collect();

    let accounts: Vec<Account> = raw_accounts
        .into_iter()
        .filter_map(|v| match serde_json::from_value::<Account>(v) {
            Ok(a) if !a.id.trim().is_empty() => Some(a),
            Ok(_) => {
                warn!("dropping remote account without id");
                None
            }
            Err(err) => {
                warn!(error = %err, "dropping undecodable remote account");
                None
            }
        })
        .collect();

    let templates = string_list(obj.remove("templates"), "templates");
    let to_buy_list = string_list(obj.remove("toBuyList"), "toBuyList");
    let updated_at = match obj.remove("updatedAt") {
        Some(Value::String(s)) => iso_date::parse(&s),
        _ => None,
    };

    Some(Pulled {
        snapshot: Snapshot {
            transactions,
            accounts,
            templates,
            to_buy_list,
        },
        updated_at,
    })
}

fn string_list(v: Option<Value>, field: &str) -> Vec<String> {
    match v {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                other => {
                    warn!(field, value = %other, "dropping non-string entry");
                    None
                }
            })
            .collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => {
            warn!(field, value = %other, "expected a list, ignoring");
            Vec::new()
        }
    }
}
