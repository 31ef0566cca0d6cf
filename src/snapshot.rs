use chrono::DateTime;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::warn;

use crate::calendar::CalendarDay;
use crate::clock::Clock;
use crate::records::WrappedData;
use crate::wrapped::semester_id;

/// Storage slot for the per-semester Wrapped snapshot. A new write
/// replaces the previous entry unconditionally.
pub const SNAPSHOT_KEY: &str = "wrapped.snapshot";
/// Storage slot for the "already seen this semester" record.
pub const VIEW_RECORD_KEY: &str = "wrapped.viewRecord";

/// Minimal get/set contract the snapshot logic persists through. Backed by
/// the workspace sqlite in the daemon and by a plain map in tests.
pub trait KvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Map-backed store for tests.
#[allow(dead_code)]
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Point-in-time copy of a student's marks/courses/attendance, pinned to
/// the semester it was taken in. `checksum` guards the payload against a
/// corrupted store; a mismatch on read counts as "no cached data".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotEntry {
    pub timestamp: i64,
    pub semester_id: String,
    pub last_working_day_date: String,
    pub checksum: String,
    pub data: WrappedData,
}

pub fn payload_checksum(payload_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload_json.as_bytes());
    hex::encode(hasher.finalize())
}

/// Persist a snapshot for the current semester, replacing any prior entry.
/// Best effort: a store or serialization failure is logged and swallowed,
/// and the return value only says whether the entry actually landed.
pub fn write_snapshot(
    store: &mut dyn KvStore,
    clock: &dyn Clock,
    data: &WrappedData,
    last_working_day: &CalendarDay,
    month_label: Option<&str>,
) -> bool {
    let payload_json = match serde_json::to_string(data) {
        Ok(text) => text,
        Err(e) => {
            warn!("wrapped snapshot payload did not serialize: {e}");
            return false;
        }
    };

    let entry = SnapshotEntry {
        timestamp: clock.now_millis(),
        semester_id: semester_id(Some(last_working_day), month_label, clock.today()),
        last_working_day_date: last_working_day.date.clone(),
        checksum: payload_checksum(&payload_json),
        data: data.clone(),
    };

    let text = match serde_json::to_string(&entry) {
        Ok(text) => text,
        Err(e) => {
            warn!("wrapped snapshot entry did not serialize: {e}");
            return false;
        }
    };
    match store.set(SNAPSHOT_KEY, &text) {
        Ok(()) => true,
        Err(e) => {
            warn!("wrapped snapshot write skipped: {e:#}");
            false
        }
    }
}

/// Read back the snapshot for the caller's semester. A store failure,
/// missing entry, unparsable JSON, checksum mismatch, or an entry from a
/// different semester all read as `None`. Same-semester entries never
/// expire.
pub fn read_snapshot(
    store: &dyn KvStore,
    clock: &dyn Clock,
    last_working_day: &CalendarDay,
    month_label: Option<&str>,
) -> Option<WrappedData> {
    let entry = read_snapshot_entry(store)?;

    let current = semester_id(Some(last_working_day), month_label, clock.today());
    if entry.semester_id != current {
        return None;
    }
    Some(entry.data)
}

/// Load and validate the stored entry without the semester check. Used by
/// the bundle exporter, which archives whatever is in the slot.
pub fn read_snapshot_entry(store: &dyn KvStore) -> Option<SnapshotEntry> {
    let text = match store.get(SNAPSHOT_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return None,
        Err(e) => {
            warn!("wrapped snapshot read failed: {e:#}");
            return None;
        }
    };

    let entry: SnapshotEntry = match serde_json::from_str(&text) {
        Ok(entry) => entry,
        Err(e) => {
            warn!("wrapped snapshot entry is not valid JSON: {e}");
            return None;
        }
    };

    let payload_json = match serde_json::to_string(&entry.data) {
        Ok(text) => text,
        Err(e) => {
            warn!("wrapped snapshot payload did not reserialize: {e}");
            return None;
        }
    };
    if payload_checksum(&payload_json) != entry.checksum {
        warn!("wrapped snapshot checksum mismatch, treating as absent");
        return None;
    }

    Some(entry)
}

/// Record that the student has seen this semester's Wrapped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewRecord {
    pub semester_id: String,
    pub viewed_at: String,
}

/// The view record keys off the wall-clock semester, not the calendar: it
/// is written at viewing time, when the calendar may no longer be loaded.
pub fn mark_viewed(store: &mut dyn KvStore, clock: &dyn Clock) -> Option<ViewRecord> {
    let record = ViewRecord {
        semester_id: semester_id(None, None, clock.today()),
        viewed_at: DateTime::from_timestamp_millis(clock.now_millis())
            .map(|t| t.to_rfc3339())
            .unwrap_or_default(),
    };
    let text = match serde_json::to_string(&record) {
        Ok(text) => text,
        Err(e) => {
            warn!("wrapped view record did not serialize: {e}");
            return None;
        }
    };
    match store.set(VIEW_RECORD_KEY, &text) {
        Ok(()) => Some(record),
        Err(e) => {
            warn!("wrapped view record write skipped: {e:#}");
            None
        }
    }
}

pub fn has_viewed(store: &dyn KvStore, clock: &dyn Clock) -> bool {
    let text = match store.get(VIEW_RECORD_KEY) {
        Ok(Some(text)) => text,
        Ok(None) => return false,
        Err(e) => {
            warn!("wrapped view record read failed: {e:#}");
            return false;
        }
    };
    let record: ViewRecord = match serde_json::from_str(&text) {
        Ok(record) => record,
        Err(_) => return false,
    };
    record.semester_id == semester_id(None, None, clock.today())
}
