/*
 *  Tromo - Discord bot for tracking per-day help counts reported by staff.
 *  Copyright (C) 2026  Tromo contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::errors::{AppError, AppResult};
use crate::utils;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use getset::{CopyGetters, Getters};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/* Data structures: */

/**
 * One recorded increment: how much was added and when.
 *
 * Serialized as `{"count": <delta>, "time": "<timestamp>"}` — the persisted
 * field is historically named `count` even though it holds the delta.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Serialize, Deserialize, Getters, CopyGetters)]
pub struct LogEntry {
    #[serde(rename = "count")]
    #[getset(get_copy = "pub")]
    delta: i64,
    /// Timestamp string, rendered in the configured time zone.
    #[getset(get = "pub")]
    time: String,
}

impl LogEntry {
    pub fn new(delta: i64, time: String) -> Self {
        Self { delta, time }
    }
}

/**
 * One user's cumulative count and increment history for a day.
 *
 * `count` always equals the sum of the log deltas, with two sanctioned
 * exceptions: `admin-set` overwrites the count without touching the logs
 * (manual correction tool), and an undo never takes the count below zero.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Serialize, Deserialize, Getters, CopyGetters)]
pub struct UserEntry {
    /// The user's display name at the time of the last write.
    #[getset(get = "pub")]
    tag: String,
    #[getset(get_copy = "pub")]
    count: i64,
    #[getset(get = "pub")]
    logs: Vec<LogEntry>,
}

impl UserEntry {
    fn new(tag: String) -> Self {
        Self {
            tag,
            count: 0,
            logs: Vec::new(),
        }
    }
}

/**
 * The full set of user entries for one calendar date.
 *
 * Entries keep their insertion order (first-increment order for the day);
 * ranking relies on that order to break ties. The persisted form is a plain
 * JSON object `{ [userId]: { tag, count, logs } }`, so serialization is done
 * by hand over an ordered vector instead of a HashMap.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Default)]
pub struct DayRecord(Vec<(String, UserEntry)>);

impl DayRecord {
    pub fn get(&self, user_id: &str) -> Option<&UserEntry> {
        self.0
            .iter()
            .find(|(id, _)| id == user_id)
            .map(|(_, entry)| entry)
    }

    fn get_mut(&mut self, user_id: &str) -> Option<&mut UserEntry> {
        self.0
            .iter_mut()
            .find(|(id, _)| id == user_id)
            .map(|(_, entry)| entry)
    }

    /**
     * Returns the entry for a user, creating it (count 0, no logs) if absent.
     */
    fn ensure(&mut self, user_id: &str, tag: &str) -> &mut UserEntry {
        if let Some(pos) = self.0.iter().position(|(id, _)| id == user_id) {
            return &mut self.0[pos].1;
        }
        self.0
            .push((user_id.to_string(), UserEntry::new(tag.to_string())));
        &mut self.0.last_mut().unwrap().1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UserEntry)> {
        self.0.iter().map(|(id, entry)| (id.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /**
     * Whether anything has actually been recorded. A record whose entries
     * have all been reset (count 0, no logs) counts as having no data.
     */
    pub fn has_data(&self) -> bool {
        self.0
            .iter()
            .any(|(_, entry)| entry.count != 0 || !entry.logs.is_empty())
    }
}

impl Serialize for DayRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (user_id, entry) in &self.0 {
            map.serialize_entry(user_id, entry)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DayRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = DayRecord;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map from user IDs to day entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                // JSON document order becomes the in-memory order.
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((user_id, entry)) = access.next_entry::<String, UserEntry>()? {
                    entries.push((user_id, entry));
                }
                Ok(DayRecord(entries))
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/* Daily store: */

/**
 * Read-modify-write store over one JSON file per calendar date.
 *
 * An owned value passed to command handlers; every operation loads the day
 * file, mutates it and writes it back, so there is no in-memory mirror to
 * go stale at day rollover.
 */
#[derive(Clone)]
pub struct Store {
    data_dir: PathBuf,
    tz: Tz,
}

impl Store {
    pub fn new(data_dir: impl Into<PathBuf>, tz: Tz) -> Self {
        Self {
            data_dir: data_dir.into(),
            tz,
        }
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /**
     * The current date in the configured time zone.
     */
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.tz).date_naive()
    }

    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.data_dir.join(format!("{}.json", date.format("%Y-%m-%d")))
    }

    /**
     * Loads the record persisted for a date.
     *
     * A missing file yields an empty record. A malformed file is logged and
     * also treated as empty; the next save overwrites it.
     */
    pub fn load(&self, date: NaiveDate) -> DayRecord {
        let path = self.day_path(date);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(_) => return DayRecord::default(),
        };
        match serde_json::from_str(&json) {
            Ok(record) => record,
            Err(e) => {
                let err = AppError::CorruptData {
                    date: date.to_string(),
                    reason: e.to_string(),
                };
                tracing::warn!(path = %path.display(), "{}. Treating the day as empty.", err);
                DayRecord::default()
            }
        }
    }

    /**
     * Overwrites the persisted form for a date with the given record.
     */
    pub fn save(&self, record: &DayRecord, date: NaiveDate) -> AppResult<()> {
        let json = serde_json::to_string_pretty(record)?;
        fs::write(self.day_path(date), json)?;
        Ok(())
    }

    /**
     * Records `delta` help for a user, creating the entry on first use.
     * Returns the user's new count for the day.
     */
    pub fn increment(
        &self,
        user_id: &str,
        tag: &str,
        delta: i64,
        date: NaiveDate,
    ) -> AppResult<i64> {
        let mut record = self.load(date);
        let entry = record.ensure(user_id, tag);
        entry.tag = tag.to_string();
        entry
            .logs
            .push(LogEntry::new(delta, utils::format_time(Utc::now(), self.tz)));
        entry.count += delta;
        let new_count = entry.count;
        self.save(&record, date)?;
        Ok(new_count)
    }

    /**
     * Removes the user's most recent increment for the day and returns it.
     * The count is decremented by the removed delta, floored at zero.
     */
    pub fn undo(&self, user_id: &str, date: NaiveDate) -> AppResult<LogEntry> {
        let mut record = self.load(date);
        let entry = record
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(String::from("Không có lượt help nào để hoàn tác.")))?;
        let removed = entry
            .logs
            .pop()
            .ok_or_else(|| AppError::NotFound(String::from("Không có lượt help nào để hoàn tác.")))?;
        entry.count = (entry.count - removed.delta).max(0);
        self.save(&record, date)?;
        Ok(removed)
    }

    /**
     * Overwrites a user's count, creating the entry if absent.
     *
     * Manual correction tool: the logs are deliberately left untouched, so
     * the count may diverge from the log sum afterwards.
     */
    pub fn admin_set(
        &self,
        user_id: &str,
        tag: &str,
        new_count: i64,
        date: NaiveDate,
    ) -> AppResult<()> {
        let mut record = self.load(date);
        let entry = record.ensure(user_id, tag);
        entry.count = new_count.max(0);
        self.save(&record, date)?;
        Ok(())
    }

    /**
     * Zeroes a user's count and clears their logs for the day.
     */
    pub fn admin_reset(&self, user_id: &str, date: NaiveDate) -> AppResult<()> {
        let mut record = self.load(date);
        let entry = record
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(String::from("Người dùng này chưa có dữ liệu hôm nay.")))?;
        entry.count = 0;
        entry.logs.clear();
        self.save(&record, date)?;
        Ok(())
    }

    /**
     * The nightly rollover: every user's count zeroed and logs cleared.
     * The day file keeps existing, just without data.
     */
    pub fn reset_all(&self, date: NaiveDate) -> AppResult<()> {
        let mut record = self.load(date);
        for (_, entry) in record.0.iter_mut() {
            entry.count = 0;
            entry.logs.clear();
        }
        self.save(&record, date)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn test_store() -> (tempfile::TempDir, Store, NaiveDate) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), chrono_tz::Asia::Ho_Chi_Minh);
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        (dir, store, date)
    }

    #[test]
    fn increments_accumulate_and_log() {
        let (_dir, store, date) = test_store();
        assert_eq!(store.increment("1", "An", 3, date).unwrap(), 3);
        assert_eq!(store.increment("1", "An", 2, date).unwrap(), 5);

        let record = store.load(date);
        let entry = record.get("1").unwrap();
        assert_eq!(entry.count(), 5);
        assert_eq!(entry.logs().len(), 2);
        assert_eq!(entry.logs()[0].delta(), 3);
        assert_eq!(entry.logs()[1].delta(), 2);
    }

    #[test]
    fn undo_pops_latest_and_floors_at_zero() {
        let (_dir, store, date) = test_store();
        store.increment("1", "An", 3, date).unwrap();
        store.increment("1", "An", 2, date).unwrap();

        let removed = store.undo("1", date).unwrap();
        assert_eq!(removed.delta(), 2);
        assert_eq!(store.load(date).get("1").unwrap().count(), 3);

        store.undo("1", date).unwrap();
        assert_eq!(store.load(date).get("1").unwrap().count(), 0);
        assert!(store.load(date).get("1").unwrap().logs().is_empty());

        // Nothing left to undo:
        assert!(matches!(store.undo("1", date), Err(AppError::NotFound(_))));
    }

    #[test]
    fn undo_on_unknown_user_fails() {
        let (_dir, store, date) = test_store();
        assert!(matches!(store.undo("404", date), Err(AppError::NotFound(_))));
    }

    #[test]
    fn undo_floors_after_admin_set_below_log_sum() {
        let (_dir, store, date) = test_store();
        store.increment("1", "An", 5, date).unwrap();
        store.admin_set("1", "An", 2, date).unwrap();

        // Removing the 5-delta log from a count of 2 must not go negative.
        store.undo("1", date).unwrap();
        assert_eq!(store.load(date).get("1").unwrap().count(), 0);
    }

    #[test]
    fn save_load_round_trip_is_stable() {
        let (_dir, store, date) = test_store();
        store.increment("2", "Bình", 1, date).unwrap();
        store.increment("1", "An", 4, date).unwrap();

        let first = store.load(date);
        store.save(&first, date).unwrap();
        let second = store.load(date);

        let ids: Vec<&str> = second.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["2", "1"]); // insertion order survives the disk
        assert_eq!(second.get("1").unwrap().count(), 4);
        assert_eq!(second.get("2").unwrap().logs().len(), 1);
    }

    #[test]
    fn corrupt_file_is_treated_as_empty() {
        let (_dir, store, date) = test_store();
        std::fs::write(store.day_path(date), "{not json").unwrap();
        let record = store.load(date);
        assert!(record.is_empty());

        // The store keeps working on top of the corrupt day:
        assert_eq!(store.increment("1", "An", 1, date).unwrap(), 1);
    }

    #[test]
    fn admin_set_creates_entry_without_logs() {
        let (_dir, store, date) = test_store();
        store.admin_set("9", "Chi", 7, date).unwrap();

        let record = store.load(date);
        let entry = record.get("9").unwrap();
        assert_eq!(entry.count(), 7);
        assert!(entry.logs().is_empty()); // count diverges from log sum by design
    }

    #[test]
    fn admin_reset_requires_an_entry() {
        let (_dir, store, date) = test_store();
        assert!(matches!(
            store.admin_reset("9", date),
            Err(AppError::NotFound(_))
        ));

        store.increment("9", "Chi", 2, date).unwrap();
        store.admin_reset("9", date).unwrap();
        let entry = store.load(date).get("9").cloned();
        assert_eq!(entry.as_ref().unwrap().count(), 0);
        assert!(entry.unwrap().logs().is_empty());
    }

    #[test]
    fn reset_all_clears_data_but_keeps_the_file() {
        let (_dir, store, date) = test_store();
        store.increment("1", "An", 3, date).unwrap();
        store.increment("2", "Bình", 1, date).unwrap();

        store.reset_all(date).unwrap();
        let record = store.load(date);
        assert_eq!(record.len(), 2);
        assert!(!record.has_data());
        assert!(store.day_path(date).exists());
    }

    #[test]
    fn missing_day_loads_empty() {
        let (_dir, store, date) = test_store();
        let record = store.load(date);
        assert!(record.is_empty());
        assert!(!record.has_data());
    }
}
