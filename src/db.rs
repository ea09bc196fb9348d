// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Moneybag", "moneybag"));

// Suffixes are bumped whenever the stored shape changes.
pub const TRANSACTIONS_KEY: &str = "transactions_v2";
pub const ACCOUNTS_KEY: &str = "accounts_v2";
pub const TEMPLATES_KEY: &str = "bazar_templates_v1";
pub const TO_BUY_KEY: &str = "to_buy_v1";
pub const SYNC_CONFIG_KEY: &str = "sync_config_v1";

const UPSERT: &str = "INSERT INTO documents(key, value, updated_at) VALUES (?1, ?2, datetime('now'))
    ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at";

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from(APP.0, APP.1, APP.2).ok_or_else(|| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not determine platform-specific data dir",
        ))
    })
}

pub fn db_path(data_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match data_dir {
        Some(dir) => dir.to_path_buf(),
        None => project_dirs()?.data_dir().to_path_buf(),
    };
    fs::create_dir_all(&dir)?;
    Ok(dir.join("moneybag.sqlite"))
}

/// Keyed JSON documents. Reads never fail; writes do.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        debug!(path = %path.display(), "opened local store");
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    pub fn with_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Returns the stored document, or `default` when it is absent or unreadable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw: Option<String> = match self
            .conn
            .query_row(
                "SELECT value FROM documents WHERE key=?1",
                params![key],
                |r| r.get(0),
            )
            .optional()
        {
            Ok(v) => v,
            Err(err) => {
                warn!(key, error = %err, "failed to read document, using default");
                return default;
            }
        };
        let Some(raw) = raw else {
            debug!(key, "document absent, using default");
            return default;
        };
        match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(err) => {
                warn!(key, error = %err, "failed to parse document, using default");
                default
            }
        }
    }

    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        self.conn.execute(UPSERT, params![key, payload])?;
        debug!(key, bytes = payload.len(), "saved document");
        Ok(())
    }

    /// Writes every document or none of them.
    pub fn save_all(&self, docs: &[(&str, serde_json::Value)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in docs {
            tx.execute(UPSERT, params![key, value.to_string()])?;
        }
        tx.commit()?;
        debug!(documents = docs.len(), "saved documents");
        Ok(())
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM documents WHERE key=?1", params![key])?;
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS documents(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL,
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    )?;
    Ok(())
}
