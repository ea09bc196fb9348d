// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::print_sync_status;
use crate::state::AppState;
use crate::sync::{Connectivity, Remote};
use crate::utils::{pretty_table, required};
use anyhow::Result;

pub fn handle_bazar<R: Remote, C: Connectivity>(
    state: &mut AppState<R, C>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let item = required(sub, "item")?;
            if state.add_template(item)? {
                println!("Added template '{}'", item.trim());
                print_sync_status(state);
            } else {
                println!("Template '{}' already exists", item.trim());
            }
        }
        Some(("list", _)) => {
            let rows = state.templates().iter().map(|t| vec![t.clone()]).collect();
            println!("{}", pretty_table(&["Bazar item"], rows));
        }
        Some(("rm", sub)) => {
            let item = required(sub, "item")?;
            if state.remove_template(item)? {
                println!("Removed template '{}'", item.trim());
                print_sync_status(state);
            } else {
                println!("No template named '{}'", item.trim());
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_to_buy<R: Remote, C: Connectivity>(
    state: &mut AppState<R, C>,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let item = required(sub, "item")?;
            if state.add_to_buy(item)? {
                println!("Added '{}' to the list", item.trim());
                print_sync_status(state);
            } else {
                println!("'{}' is already on the list", item.trim());
            }
        }
        Some(("list", _)) => {
            let rows = state
                .to_buy_list()
                .iter()
                .enumerate()
                .map(|(i, t)| vec![(i + 1).to_string(), t.clone()])
                .collect();
            println!("{}", pretty_table(&["#", "To buy"], rows));
        }
        Some(("done", sub)) => {
            let item = required(sub, "item")?;
            if state.remove_to_buy(item)? {
                println!("Checked off '{}'", item.trim());
                print_sync_status(state);
            } else {
                println!("'{}' is not on the list", item.trim());
            }
        }
        _ => {}
    }
    Ok(())
}
