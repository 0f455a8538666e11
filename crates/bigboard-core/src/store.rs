// Per-player scouting report collections on top of a string key-value backend.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::{Config, StorageKind};
use crate::dataset::PlayerId;
use crate::db::Database;
use crate::report::ScoutingReport;

// ---------------------------------------------------------------------------
// Backends
// ---------------------------------------------------------------------------

/// Durable string key-value storage.
pub trait StorageBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Process-local backend. Contents vanish with the process.
#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().map_err(|_| anyhow!("storage mutex poisoned"))?;
        Ok(items.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().map_err(|_| anyhow!("storage mutex poisoned"))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().map_err(|_| anyhow!("storage mutex poisoned"))?;
        items.remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ReportStore
// ---------------------------------------------------------------------------

/// Scouting reports grouped per player, newest first, stored as one JSON
/// array under `report_player_{id}`.
#[derive(Clone)]
pub struct ReportStore {
    backend: Arc<dyn StorageBackend>,
}

impl ReportStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Open the backend selected by `[storage]`.
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.storage.backend {
            StorageKind::Memory => {
                info!("Using in-memory report storage");
                Ok(Self::in_memory())
            }
            StorageKind::Sqlite => {
                let path = config.db_path();
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).with_context(|| {
                        format!("failed to create data directory {}", parent.display())
                    })?;
                }
                let path_str = path.to_string_lossy();
                let db = Database::open(&path_str)?;
                info!("Using SQLite report storage at {}", path.display());
                Ok(Self::new(Arc::new(db)))
            }
        }
    }

    pub fn storage_key(player_id: PlayerId) -> String {
        format!("report_player_{player_id}")
    }

    /// Every valid report for `player_id`, newest first. Never fails: a
    /// missing, unreadable, or corrupt collection reads as empty.
    pub fn list(&self, player_id: PlayerId) -> Vec<ScoutingReport> {
        let key = Self::storage_key(player_id);
        match self.backend.get(&key) {
            Ok(Some(raw)) => parse_collection(&raw, player_id),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to read {key}: {e:#}");
                Vec::new()
            }
        }
    }

    /// Prepend `report` to the player's collection and persist it. The id is
    /// made unique within the collection; the stored report is returned.
    pub fn append(&self, player_id: PlayerId, mut report: ScoutingReport) -> Result<ScoutingReport> {
        let mut reports = self.list(player_id);
        let taken: HashSet<String> = reports.iter().map(|r| r.id.clone()).collect();
        let base = if report.id.is_empty() {
            id_from_created_at(&report.created_at)
        } else {
            report.id.clone()
        };
        report.id = unique_id(&base, &taken);
        report.player_id = player_id;

        reports.insert(0, report.clone());
        self.save(player_id, &reports)?;
        info!(
            "Saved report {} for player {player_id} ({} total)",
            report.id,
            reports.len()
        );
        Ok(report)
    }

    /// Remove the report with `report_id`. Returns whether one was removed.
    pub fn delete(&self, player_id: PlayerId, report_id: &str) -> Result<bool> {
        let mut reports = self.list(player_id);
        let before = reports.len();
        reports.retain(|r| r.id != report_id);
        if reports.len() == before {
            return Ok(false);
        }
        self.save(player_id, &reports)?;
        info!("Deleted report {report_id} for player {player_id}");
        Ok(true)
    }

    /// Store `summary` on an existing report. Returns whether it was found.
    pub fn attach_summary(&self, player_id: PlayerId, report_id: &str, summary: &str) -> Result<bool> {
        let mut reports = self.list(player_id);
        let Some(report) = reports.iter_mut().find(|r| r.id == report_id) else {
            return Ok(false);
        };
        report.summary = Some(summary.to_string());
        self.save(player_id, &reports)?;
        Ok(true)
    }

    fn save(&self, player_id: PlayerId, reports: &[ScoutingReport]) -> Result<()> {
        let key = Self::storage_key(player_id);
        let json = serde_json::to_string(reports).context("failed to serialize reports")?;
        self.backend
            .set(&key, &json)
            .with_context(|| format!("failed to persist {key}"))
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Parse a stored collection, tolerating older shapes.
///
/// A bare report object becomes a one-element list. Entries that are not
/// objects with `createdAt`, or that fail to deserialize, are dropped.
/// Reports without an id get one derived from `createdAt`.
fn parse_collection(raw: &str, player_id: PlayerId) -> Vec<ScoutingReport> {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            warn!("Ignoring corrupt report data for player {player_id}: {e}");
            return Vec::new();
        }
    };

    let entries = match value {
        Value::Array(items) => items,
        obj @ Value::Object(_) => vec![obj],
        _ => return Vec::new(),
    };

    let mut reports = Vec::with_capacity(entries.len());
    let mut taken = HashSet::new();
    for entry in entries {
        let has_created_at = entry
            .as_object()
            .is_some_and(|o| o.get("createdAt").is_some_and(|c| !c.is_null()));
        if !has_created_at {
            continue;
        }
        let mut report: ScoutingReport = match serde_json::from_value(entry) {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping malformed report for player {player_id}: {e}");
                continue;
            }
        };
        report.player_id = player_id;
        let base = if report.id.is_empty() {
            id_from_created_at(&report.created_at)
        } else {
            report.id.clone()
        };
        report.id = unique_id(&base, &taken);
        taken.insert(report.id.clone());
        reports.push(report);
    }
    reports
}

/// Stable id for a legacy report keyed only by its timestamp.
fn id_from_created_at(created_at: &str) -> String {
    let slug: String = created_at
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() => Some(c),
            '/' | ':' | ' ' | ',' | '-' => Some('_'),
            _ => None,
        })
        .collect();
    format!("legacy_{slug}")
}

fn unique_id(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
