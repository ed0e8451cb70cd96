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
use crate::store::{DayRecord, Store, UserEntry};
use chrono::{Days, NaiveDate};
use getset::{CopyGetters, Getters};

/**
 * Ranks a day's entries by count, descending.
 *
 * The sort is stable, so ties keep the record's insertion order (the order
 * users first appeared that day).
 */
pub fn rank(record: &DayRecord) -> Vec<(&str, &UserEntry)> {
    let mut ranked: Vec<(&str, &UserEntry)> = record.iter().collect();
    ranked.sort_by(|a, b| b.1.count().cmp(&a.1.count()));
    ranked
}

/**
 * The 1-based leaderboard position of a user for the day, if they have an
 * entry at all.
 */
pub fn rank_of(user_id: &str, record: &DayRecord) -> Option<usize> {
    rank(record)
        .iter()
        .position(|(id, _)| *id == user_id)
        .map(|pos| pos + 1)
}

/**
 * The grand total across all users for the day.
 */
pub fn total(record: &DayRecord) -> i64 {
    record.iter().map(|(_, entry)| entry.count()).sum()
}

/**
 * One log entry of a weekly rollup, tagged with the date it came from.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Getters, CopyGetters)]
pub struct DatedLog {
    #[getset(get_copy = "pub")]
    date: NaiveDate,
    #[getset(get_copy = "pub")]
    delta: i64,
    #[getset(get = "pub")]
    time: String,
}

/**
 * One user's rollup over a 7-day window.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Clone, Getters, CopyGetters)]
pub struct WeeklyEntry {
    /// The most recent display name seen inside the window.
    #[getset(get = "pub")]
    tag: String,
    #[getset(get_copy = "pub")]
    count: i64,
    #[getset(get = "pub")]
    logs: Vec<DatedLog>,
}

/**
 * Union of the 7 daily records ending at `anchor` inclusive.
 *
 * Days with no file contribute nothing; a user present on only some days is
 * included with the partial sum. Output order is first-seen order across the
 * window, oldest day first.
 */
pub fn weekly_totals(store: &Store, anchor: NaiveDate) -> Vec<(String, WeeklyEntry)> {
    let mut totals: Vec<(String, WeeklyEntry)> = Vec::new();

    for offset in (0..7).rev() {
        let Some(date) = anchor.checked_sub_days(Days::new(offset)) else {
            continue;
        };
        let record = store.load(date);

        for (user_id, entry) in record.iter() {
            let rollup = match totals.iter_mut().find(|(id, _)| id == user_id) {
                Some((_, rollup)) => rollup,
                None => {
                    totals.push((
                        user_id.to_string(),
                        WeeklyEntry {
                            tag: entry.tag().clone(),
                            count: 0,
                            logs: Vec::new(),
                        },
                    ));
                    &mut totals.last_mut().unwrap().1
                }
            };
            rollup.tag = entry.tag().clone();
            rollup.count += entry.count();
            for log in entry.logs() {
                rollup.logs.push(DatedLog {
                    date,
                    delta: log.delta(),
                    time: log.time().clone(),
                });
            }
        }
    }

    totals
}

/**
 * Ranks a weekly rollup by count, descending, ties in first-seen order.
 */
pub fn rank_weekly(totals: &[(String, WeeklyEntry)]) -> Vec<(&str, &WeeklyEntry)> {
    let mut ranked: Vec<(&str, &WeeklyEntry)> = totals
        .iter()
        .map(|(id, entry)| (id.as_str(), entry))
        .collect();
    ranked.sort_by(|a, b| b.1.count().cmp(&a.1.count()));
    ranked
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
    fn rank_sorts_descending_with_stable_ties() {
        let (_dir, store, date) = test_store();
        store.increment("1", "An", 2, date).unwrap();
        store.increment("2", "Bình", 5, date).unwrap();
        store.increment("3", "Chi", 2, date).unwrap();

        let record = store.load(date);
        let ranked = rank(&record);
        let ids: Vec<&str> = ranked.iter().map(|(id, _)| *id).collect();
        // "1" and "3" tie on 2; "1" appeared first and stays ahead.
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn rank_is_idempotent() {
        let (_dir, store, date) = test_store();
        store.increment("1", "An", 1, date).unwrap();
        store.increment("2", "Bình", 1, date).unwrap();

        let record = store.load(date);
        let first: Vec<String> = rank(&record).iter().map(|(id, _)| id.to_string()).collect();
        let second: Vec<String> = rank(&record).iter().map(|(id, _)| id.to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rank_of_is_one_based_and_absent_for_strangers() {
        let (_dir, store, date) = test_store();
        store.increment("1", "An", 1, date).unwrap();
        store.increment("2", "Bình", 9, date).unwrap();

        let record = store.load(date);
        assert_eq!(rank_of("2", &record), Some(1));
        assert_eq!(rank_of("1", &record), Some(2));
        assert_eq!(rank_of("404", &record), None);
    }

    #[test]
    fn total_sums_all_counts() {
        let (_dir, store, date) = test_store();
        assert_eq!(total(&store.load(date)), 0);
        store.increment("1", "An", 3, date).unwrap();
        store.increment("2", "Bình", 4, date).unwrap();
        assert_eq!(total(&store.load(date)), 7);
    }

    #[test]
    fn weekly_window_with_single_populated_day_equals_that_day() {
        let (_dir, store, anchor) = test_store();
        store.increment("1", "An", 3, anchor).unwrap();
        store.increment("2", "Bình", 1, anchor).unwrap();

        let totals = weekly_totals(&store, anchor);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].0, "1");
        assert_eq!(totals[0].1.count(), 3);
        assert_eq!(totals[1].1.count(), 1);
    }

    #[test]
    fn weekly_sums_partial_attendance_and_tags_log_dates() {
        let (_dir, store, anchor) = test_store();
        let two_days_ago = anchor.checked_sub_days(Days::new(2)).unwrap();
        store.increment("1", "An", 2, two_days_ago).unwrap();
        store.increment("1", "An", 3, anchor).unwrap();
        store.increment("2", "Bình", 1, anchor).unwrap();

        let totals = weekly_totals(&store, anchor);
        let an = &totals.iter().find(|(id, _)| id == "1").unwrap().1;
        assert_eq!(an.count(), 5);
        assert_eq!(an.logs().len(), 2);
        assert_eq!(an.logs()[0].date(), two_days_ago);
        assert_eq!(an.logs()[1].date(), anchor);
    }

    #[test]
    fn weekly_ignores_days_outside_the_window() {
        let (_dir, store, anchor) = test_store();
        let eight_days_ago = anchor.checked_sub_days(Days::new(8)).unwrap();
        store.increment("1", "An", 10, eight_days_ago).unwrap();

        assert!(weekly_totals(&store, anchor).is_empty());
    }
}
