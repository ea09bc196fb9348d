// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod transactions;
pub mod reports;
pub mod lending;
pub mod shopping;
pub mod sync;
pub mod exporter;

use anyhow::{Context, Result};

use crate::state::AppState;
use crate::sync::{Connectivity, Remote};

/// Account id for an `--account` value, or the default account when absent.
pub fn resolve_account<R: Remote, C: Connectivity>(
    state: &AppState<R, C>,
    key: Option<&String>,
) -> Result<String> {
    match key {
        Some(k) => state
            .find_account(k)
            .map(|a| a.id.clone())
            .with_context(|| format!("Account '{}' not found", k)),
        None => Ok(state.default_account().id.clone()),
    }
}

/// One line after a mutation so the user can see where the auto-push landed.
pub fn print_sync_status<R: Remote, C: Connectivity>(state: &AppState<R, C>) {
    if state.sync_config().is_configured() {
        println!("Sync: {}", state.status());
        if let Some(remote_at) = state.overwrote_remote() {
            println!(
                "Warning: replaced remote data written at {} that was never pulled here",
                remote_at.to_rfc3339()
            );
        }
    }
}
