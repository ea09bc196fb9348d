// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid transaction: {0}")]
    Invalid(String),
    #[error("transaction '{0}' not found")]
    TransactionNotFound(String),
    #[error("account '{0}' not found")]
    AccountNotFound(String),
    #[error("cannot delete the last remaining account")]
    LastAccount,
    #[error("device is offline; connect to the network and try again")]
    Offline,
    #[error("sync is not configured; run `sync set-url <url>` first")]
    NotConfigured,
    #[error("could not pull data from the sync endpoint")]
    PullFailed,
}
