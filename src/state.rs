// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The single source of truth for the running app.
//!
//! Every intent persists to the [`Store`] first and then attempts an
//! auto-push. Sync status is informational; it never blocks a mutation.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::db::{
    ACCOUNTS_KEY, SYNC_CONFIG_KEY, Store, TEMPLATES_KEY, TO_BUY_KEY, TRANSACTIONS_KEY,
};
use crate::error::{AppError, Result};
use crate::models::{Account, Snapshot, SyncConfig, SyncStatus, Transaction, default_accounts};
use crate::sync::{Connectivity, Remote};

pub struct AppState<R: Remote, C: Connectivity> {
    store: Store,
    remote: R,
    connectivity: C,
    data: Snapshot,
    sync: SyncConfig,
    status: SyncStatus,
    /// Remote stamp replaced by the last automatic push, if it was newer than ours.
    overwrote_remote: Option<DateTime<Utc>>,
}

impl<R: Remote, C: Connectivity> AppState<R, C> {
    pub fn load(store: Store, remote: R, connectivity: C) -> Self {
        let mut accounts: Vec<Account> = store.load(ACCOUNTS_KEY, default_accounts());
        if accounts.is_empty() {
            accounts = default_accounts();
        }
        let data = Snapshot {
            transactions: store.load(TRANSACTIONS_KEY, Vec::new()),
            accounts,
            templates: store.load(TEMPLATES_KEY, Vec::new()),
            to_buy_list: store.load(TO_BUY_KEY, Vec::new()),
        };
        let sync: SyncConfig = store.load(SYNC_CONFIG_KEY, SyncConfig::default());
        let status = if sync.pending {
            SyncStatus::Pending
        } else {
            SyncStatus::None
        };
        debug!(
            transactions = data.transactions.len(),
            accounts = data.accounts.len(),
            %status,
            "state loaded"
        );
        Self {
            store,
            remote,
            connectivity,
            data,
            sync,
            status,
            overwrote_remote: None,
        }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.data.transactions
    }

    pub fn accounts(&self) -> &[Account] {
        &self.data.accounts
    }

    pub fn templates(&self) -> &[String] {
        &self.data.templates
    }

    pub fn to_buy_list(&self) -> &[String] {
        &self.data.to_buy_list
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.data
    }

    pub fn sync_config(&self) -> &SyncConfig {
        &self.sync
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn overwrote_remote(&self) -> Option<DateTime<Utc>> {
        self.overwrote_remote
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn connectivity(&self) -> &C {
        &self.connectivity
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.data.transactions.iter().find(|t| t.id == id)
    }

    /// Matches an account by id, or by name ignoring case.
    pub fn find_account(&self, key: &str) -> Option<&Account> {
        let key = key.trim();
        self.data
            .accounts
            .iter()
            .find(|a| a.id == key)
            .or_else(|| {
                self.data
                    .accounts
                    .iter()
                    .find(|a| a.name.eq_ignore_ascii_case(key))
            })
    }

    pub fn default_account(&self) -> &Account {
        self.data
            .accounts
            .iter()
            .find(|a| a.is_default())
            .unwrap_or(&self.data.accounts[0])
    }

    // --- transactions ---

    pub fn add_transaction(&mut self, tx: Transaction) -> Result<String> {
        tx.validate()?;
        if self.transaction(&tx.id).is_some() {
            return Err(AppError::Invalid(format!("duplicate id '{}'", tx.id)));
        }
        let id = tx.id.clone();
        self.data.transactions.push(tx);
        self.commit_transactions()?;
        Ok(id)
    }

    pub fn update_transaction(&mut self, tx: Transaction) -> Result<()> {
        tx.validate()?;
        let slot = self
            .data
            .transactions
            .iter_mut()
            .find(|t| t.id == tx.id)
            .ok_or_else(|| AppError::TransactionNotFound(tx.id.clone()))?;
        *slot = tx;
        self.commit_transactions()
    }

    pub fn delete_transaction(&mut self, id: &str) -> Result<()> {
        let before = self.data.transactions.len();
        self.data.transactions.retain(|t| t.id != id);
        if self.data.transactions.len() == before {
            return Err(AppError::TransactionNotFound(id.to_string()));
        }
        self.commit_transactions()
    }

    fn commit_transactions(&mut self) -> Result<()> {
        self.store.save(TRANSACTIONS_KEY, &self.data.transactions)?;
        self.auto_push()?;
        Ok(())
    }

    // --- accounts ---

    pub fn add_account(&mut self, account: Account) -> Result<()> {
        if self.data.accounts.iter().any(|a| a.id == account.id) {
            return Err(AppError::Invalid(format!(
                "account id '{}' already exists",
                account.id
            )));
        }
        if account.is_default() {
            clear_defaults(&mut self.data.accounts);
        }
        self.data.accounts.push(account);
        self.commit_accounts()
    }

    pub fn update_account(&mut self, account: Account) -> Result<()> {
        let pos = self
            .data
            .accounts
            .iter()
            .position(|a| a.id == account.id)
            .ok_or_else(|| AppError::AccountNotFound(account.id.clone()))?;
        let was_default = self.data.accounts[pos].is_default();
        if account.is_default() {
            clear_defaults(&mut self.data.accounts);
        }
        self.data.accounts[pos] = account;
        if was_default && !self.data.accounts[pos].is_default() {
            let heir = (0..self.data.accounts.len())
                .find(|&i| i != pos)
                .unwrap_or(pos);
            self.data.accounts[heir].is_default = Some(true);
        }
        self.commit_accounts()
    }

    pub fn rename_account(&mut self, id: &str, name: &str) -> Result<()> {
        let slot = self
            .data
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))?;
        slot.name = name.trim().to_string();
        self.commit_accounts()
    }

    pub fn set_default_account(&mut self, id: &str) -> Result<()> {
        if !self.data.accounts.iter().any(|a| a.id == id) {
            return Err(AppError::AccountNotFound(id.to_string()));
        }
        for a in self.data.accounts.iter_mut() {
            a.is_default = if a.id == id { Some(true) } else { None };
        }
        self.commit_accounts()
    }

    /// Leaves transactions pointing at the account untouched.
    pub fn delete_account(&mut self, id: &str) -> Result<()> {
        let pos = self
            .data
            .accounts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AppError::AccountNotFound(id.to_string()))?;
        if self.data.accounts.len() <= 1 {
            return Err(AppError::LastAccount);
        }
        let removed = self.data.accounts.remove(pos);
        if removed.is_default() {
            self.data.accounts[0].is_default = Some(true);
        }
        self.commit_accounts()
    }

    pub fn set_accounts(&mut self, accounts: Vec<Account>) -> Result<()> {
        if accounts.is_empty() {
            return Err(AppError::LastAccount);
        }
        self.data.accounts = accounts;
        self.commit_accounts()
    }

    fn commit_accounts(&mut self) -> Result<()> {
        self.store.save(ACCOUNTS_KEY, &self.data.accounts)?;
        self.auto_push()?;
        Ok(())
    }

    // --- bazar templates and to-buy list ---

    /// Returns `false` when the item was already present.
    pub fn add_template(&mut self, item: &str) -> Result<bool> {
        if !push_unique(&mut self.data.templates, item) {
            return Ok(false);
        }
        self.commit_templates()?;
        Ok(true)
    }

    pub fn remove_template(&mut self, item: &str) -> Result<bool> {
        if !remove_item(&mut self.data.templates, item) {
            return Ok(false);
        }
        self.commit_templates()?;
        Ok(true)
    }

    pub fn set_templates(&mut self, items: Vec<String>) -> Result<()> {
        self.data.templates = items;
        self.commit_templates()
    }

    fn commit_templates(&mut self) -> Result<()> {
        self.store.save(TEMPLATES_KEY, &self.data.templates)?;
        self.auto_push()?;
        Ok(())
    }

    pub fn add_to_buy(&mut self, item: &str) -> Result<bool> {
        if !push_unique(&mut self.data.to_buy_list, item) {
            return Ok(false);
        }
        self.commit_to_buy()?;
        Ok(true)
    }

    pub fn remove_to_buy(&mut self, item: &str) -> Result<bool> {
        if !remove_item(&mut self.data.to_buy_list, item) {
            return Ok(false);
        }
        self.commit_to_buy()?;
        Ok(true)
    }

    pub fn set_to_buy(&mut self, items: Vec<String>) -> Result<()> {
        self.data.to_buy_list = items;
        self.commit_to_buy()
    }

    fn commit_to_buy(&mut self) -> Result<()> {
        self.store.save(TO_BUY_KEY, &self.data.to_buy_list)?;
        self.auto_push()?;
        Ok(())
    }

    // --- sync ---

    pub fn set_sync_url(&mut self, url: &str) -> Result<()> {
        self.sync.url = url.trim().to_string();
        self.save_sync()?;
        info!(url = %self.sync.url, "sync endpoint configured");
        Ok(())
    }

    pub fn clear_sync(&mut self) -> Result<()> {
        self.sync = SyncConfig::default();
        self.store.remove(SYNC_CONFIG_KEY)?;
        self.status = SyncStatus::None;
        Ok(())
    }

    /// Best-effort push after a local mutation. Only store writes can fail.
    pub fn auto_push(&mut self) -> Result<SyncStatus> {
        if !self.sync.is_configured() {
            return Ok(self.status);
        }
        if !self.connectivity.is_online() {
            debug!("offline, deferring push");
            self.status = SyncStatus::Pending;
            if !self.sync.pending {
                self.sync.pending = true;
                self.save_sync()?;
            }
            return Ok(self.status);
        }
        self.checked_push()?;
        Ok(self.status)
    }

    /// Connectivity changed. Fires the deferred push once the device is back online.
    pub fn on_connectivity_change(&mut self) -> Result<Option<bool>> {
        if !self.connectivity.is_online() || !self.sync.pending {
            return Ok(None);
        }
        info!("back online, sending deferred push");
        self.checked_push().map(Some)
    }

    pub fn flush_pending(&mut self) -> Result<Option<bool>> {
        self.on_connectivity_change()
    }

    /// Manual push. Unlike auto-push this reports offline and unconfigured states.
    pub fn push_now(&mut self) -> Result<bool> {
        if !self.connectivity.is_online() {
            return Err(AppError::Offline);
        }
        if !self.sync.is_configured() {
            return Err(AppError::NotConfigured);
        }
        self.push_snapshot()
    }

    /// Automatic pushes stay last-writer-wins but record a newer remote copy they replace.
    fn checked_push(&mut self) -> Result<bool> {
        let newer = match self.remote.pull(&self.sync.url) {
            Some(pulled) => pulled.updated_at.filter(|&at| self.is_unseen(at)),
            None => {
                debug!("could not read remote stamp before push");
                None
            }
        };
        if let Some(remote_at) = newer {
            warn!(%remote_at, "overwriting remote data newer than the last local pull");
        }
        self.overwrote_remote = newer;
        self.push_snapshot()
    }

    fn is_unseen(&self, remote_at: DateTime<Utc>) -> bool {
        self.sync
            .last_pulled
            .max(self.sync.last_synced)
            .is_none_or(|seen| remote_at > seen)
    }

    fn push_snapshot(&mut self) -> Result<bool> {
        self.status = SyncStatus::Syncing;
        let ok = self.remote.push(&self.sync.url, &self.data);
        if ok {
            self.status = SyncStatus::Synced;
            self.sync.last_synced = Some(Utc::now());
            self.sync.pending = false;
            self.save_sync()?;
        } else {
            warn!("push failed, local data kept");
            self.status = SyncStatus::Error;
        }
        Ok(ok)
    }

    /// Replaces all local data with the remote snapshot.
    ///
    /// Silent pulls swallow failures and keep the previous status.
    pub fn pull(&mut self, silent: bool) -> Result<bool> {
        if !self.connectivity.is_online() {
            if silent {
                return Ok(false);
            }
            return Err(AppError::Offline);
        }
        if !self.sync.is_configured() {
            if silent {
                return Ok(false);
            }
            return Err(AppError::NotConfigured);
        }

        let prior = self.status;
        self.status = SyncStatus::Syncing;
        match self.remote.pull(&self.sync.url) {
            Some(pulled) => match self.apply_pull(pulled.snapshot) {
                Ok(()) => {
                    self.status = SyncStatus::Synced;
                    self.overwrote_remote = None;
                    info!(
                        transactions = self.data.transactions.len(),
                        accounts = self.data.accounts.len(),
                        "pulled remote snapshot"
                    );
                    Ok(true)
                }
                Err(err) => {
                    warn!(error = %err, "could not store pulled snapshot");
                    self.status = SyncStatus::Error;
                    Err(err)
                }
            },
            None if silent => {
                self.status = prior;
                Ok(false)
            }
            None => {
                self.status = SyncStatus::Error;
                Err(AppError::PullFailed)
            }
        }
    }

    /// `Some(stamp)` when the remote copy was written after our last pull or push.
    pub fn remote_is_newer(&self) -> Result<Option<DateTime<Utc>>> {
        if !self.connectivity.is_online() {
            return Err(AppError::Offline);
        }
        if !self.sync.is_configured() {
            return Err(AppError::NotConfigured);
        }
        let pulled = self
            .remote
            .pull(&self.sync.url)
            .ok_or(AppError::PullFailed)?;
        match pulled.updated_at {
            Some(remote_at) if self.is_unseen(remote_at) => {
                warn!(%remote_at, "remote data is newer than the last local pull");
                Ok(Some(remote_at))
            }
            _ => Ok(None),
        }
    }

    /// Memory only changes once every document is stored.
    fn apply_pull(&mut self, mut snapshot: Snapshot) -> Result<()> {
        if snapshot.accounts.is_empty() {
            warn!("remote snapshot has no accounts, keeping the default account");
            snapshot.accounts = default_accounts();
        }
        self.store.save_all(&[
            (TRANSACTIONS_KEY, serde_json::to_value(&snapshot.transactions)?),
            (ACCOUNTS_KEY, serde_json::to_value(&snapshot.accounts)?),
            (TEMPLATES_KEY, serde_json::to_value(&snapshot.templates)?),
            (TO_BUY_KEY, serde_json::to_value(&snapshot.to_buy_list)?),
        ])?;
        self.data = snapshot;

        let now = Utc::now();
        self.sync.last_pulled = Some(now);
        self.sync.last_synced = Some(now);
        self.sync.pending = false;
        self.save_sync()
    }

    fn save_sync(&self) -> Result<()> {
        self.store.save(SYNC_CONFIG_KEY, &self.sync)
    }
}

fn clear_defaults(accounts: &mut [Account]) {
    for a in accounts.iter_mut() {
        a.is_default = None;
    }
}

fn push_unique(list: &mut Vec<String>, item: &str) -> bool {
    let item = item.trim();
    if item.is_empty() || list.iter().any(|i| i.eq_ignore_ascii_case(item)) {
        return false;
    }
    list.push(item.to_string());
    true
}

fn remove_item(list: &mut Vec<String>, item: &str) -> bool {
    let item = item.trim();
    let before = list.len();
    list.retain(|i| !i.eq_ignore_ascii_case(item));
    list.len() != before
}
