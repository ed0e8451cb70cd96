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
use crate::aggregate;
use crate::errors::{AppError, AppResult, ErrorLog};
use crate::export;
use crate::store::{DayRecord, Store};
use async_trait::async_trait;
use chrono::NaiveDate;
use serenity::all::{ChannelId, Http};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

/// Summary shown when a day has nothing recorded.
pub const NO_DATA_NOTICE: &str = "📭 Chưa có lượt trợ giúp nào được ghi nhận hôm nay.";

/**
 * Where a report summary gets delivered: a channel for the nightly job, a
 * responder for the on-demand `summarize` command.
 */
#[async_trait]
pub trait SummarySink: Send {
    async fn deliver(&mut self, summary: &str) -> AppResult<()>;
}

#[async_trait]
impl<T: crate::respond::ResponseTransport> SummarySink for crate::respond::Responder<T> {
    async fn deliver(&mut self, summary: &str) -> AppResult<()> {
        self.send(summary).await
    }
}

/**
 * Sink that posts the summary to a fixed channel (the nightly report path).
 */
pub struct ChannelSink {
    http: Arc<Http>,
    channel: ChannelId,
}

impl ChannelSink {
    pub fn new(http: Arc<Http>, channel: ChannelId) -> Self {
        Self { http, channel }
    }
}

#[async_trait]
impl SummarySink for ChannelSink {
    async fn deliver(&mut self, summary: &str) -> AppResult<()> {
        self.channel
            .say(self.http.as_ref(), summary)
            .await
            .map_err(|e| AppError::Delivery(e.to_string()))?;
        Ok(())
    }
}

/**
 * The outcome of a report run.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
pub struct Report {
    pub summary: String,
    pub exported: Option<PathBuf>,
}

fn medal(position: usize) -> &'static str {
    match position {
        1 => "🥇",
        2 => "🥈",
        3 => "🥉",
        _ => "▫️",
    }
}

/**
 * Renders daily summaries and drives the report → export → reset sequence.
 */
pub struct Reporter {
    store: Store,
    export_dir: PathBuf,
    separator: String,
    errors: Arc<ErrorLog>,
}

impl Reporter {
    pub fn new(
        store: Store,
        export_dir: impl Into<PathBuf>,
        separator: String,
        errors: Arc<ErrorLog>,
    ) -> Self {
        Self {
            store,
            export_dir: export_dir.into(),
            separator,
            errors,
        }
    }

    /**
     * Builds the ranked human-readable summary: medals for the top three
     * positions, a neutral marker otherwise, grand total at the bottom.
     */
    pub fn render(&self, record: &DayRecord) -> String {
        if !record.has_data() {
            return NO_DATA_NOTICE.to_string();
        }

        let mut out = String::from("📊 **Tổng kết lượt trợ giúp trong ngày**\n");
        for (position, (_, entry)) in aggregate::rank(record).iter().enumerate() {
            writeln!(
                out,
                "{} **{}** — {} help",
                medal(position + 1),
                entry.tag(),
                entry.count()
            )
            .unwrap();
        }
        write!(out, "\nTổng cộng: **{}** lượt help", aggregate::total(record)).unwrap();
        out
    }

    /**
     * Runs a full report for a date.
     *
     * Order of effects matters: the summary is delivered first (a delivery
     * failure aborts everything), the CSV export is best-effort, and the
     * reset only happens after the totals have actually gone out. An empty
     * day delivers the fixed notice and stops there.
     */
    pub async fn generate(
        &self,
        date: NaiveDate,
        reset_after: bool,
        sink: &mut dyn SummarySink,
    ) -> AppResult<Report> {
        let record = self.store.load(date);
        let summary = self.render(&record);

        sink.deliver(&summary).await?;

        if !record.has_data() {
            return Ok(Report {
                summary,
                exported: None,
            });
        }

        let path = export::csv_path(&self.export_dir, date);
        let exported = match export::export_csv(&record, &path, &self.separator) {
            Ok(()) => Some(path),
            Err(e) => {
                tracing::warn!("Report export failed: {}. Summary was still delivered.", e);
                self.errors.push("report-export", &e.to_string());
                None
            }
        };

        if reset_after {
            self.store.reset_all(date)?;
        }

        Ok(Report { summary, exported })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    struct VecSink(Vec<String>);

    #[async_trait]
    impl SummarySink for VecSink {
        async fn deliver(&mut self, summary: &str) -> AppResult<()> {
            self.0.push(summary.to_string());
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl SummarySink for FailingSink {
        async fn deliver(&mut self, _summary: &str) -> AppResult<()> {
            Err(AppError::Delivery(String::from("channel unavailable")))
        }
    }

    fn fixture() -> (tempfile::TempDir, Store, Reporter, NaiveDate) {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let export_dir = dir.path().join("exports");
        std::fs::create_dir_all(&data_dir).unwrap();
        std::fs::create_dir_all(&export_dir).unwrap();
        let store = Store::new(&data_dir, chrono_tz::Asia::Ho_Chi_Minh);
        let reporter = Reporter::new(
            store.clone(),
            &export_dir,
            String::from(" | "),
            Arc::new(ErrorLog::default()),
        );
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        (dir, store, reporter, date)
    }

    #[test]
    fn render_awards_medals_to_the_top_three() {
        let (_dir, store, reporter, date) = fixture();
        store.increment("1", "An", 4, date).unwrap();
        store.increment("2", "Bình", 3, date).unwrap();
        store.increment("3", "Chi", 2, date).unwrap();
        store.increment("4", "Dũng", 1, date).unwrap();

        let summary = reporter.render(&store.load(date));
        assert!(summary.contains("🥇 **An** — 4 help"));
        assert!(summary.contains("🥈 **Bình** — 3 help"));
        assert!(summary.contains("🥉 **Chi** — 2 help"));
        assert!(summary.contains("▫️ **Dũng** — 1 help"));
        assert!(summary.contains("Tổng cộng: **10** lượt help"));
    }

    #[tokio::test]
    async fn empty_day_delivers_notice_without_export_or_reset() {
        let (_dir, store, reporter, date) = fixture();
        let mut sink = VecSink(Vec::new());

        let report = reporter.generate(date, true, &mut sink).await.unwrap();
        assert_eq!(report.summary, NO_DATA_NOTICE);
        assert!(report.exported.is_none());
        assert_eq!(sink.0, vec![NO_DATA_NOTICE.to_string()]);
        // No file was ever created for the day:
        assert!(!store.day_path(date).exists());
    }

    #[tokio::test]
    async fn full_run_delivers_exports_and_resets() {
        let (_dir, store, reporter, date) = fixture();
        store.increment("1", "An", 3, date).unwrap();
        store.increment("2", "Bình", 2, date).unwrap();

        let mut sink = VecSink(Vec::new());
        let report = reporter.generate(date, true, &mut sink).await.unwrap();

        assert_eq!(sink.0.len(), 1);
        let exported = report.exported.expect("export should have happened");
        assert!(exported.exists());

        // Yesterday's totals were delivered, then destroyed:
        let after = store.load(date);
        assert!(!after.has_data());
        assert_eq!(after.len(), 2);
    }

    #[tokio::test]
    async fn reset_false_keeps_the_data() {
        let (_dir, store, reporter, date) = fixture();
        store.increment("1", "An", 3, date).unwrap();

        let mut sink = VecSink(Vec::new());
        reporter.generate(date, false, &mut sink).await.unwrap();
        assert_eq!(store.load(date).get("1").unwrap().count(), 3);
    }

    #[tokio::test]
    async fn delivery_failure_aborts_before_export_and_reset() {
        let (_dir, store, reporter, date) = fixture();
        store.increment("1", "An", 3, date).unwrap();

        let result = reporter.generate(date, true, &mut FailingSink).await;
        assert!(matches!(result, Err(AppError::Delivery(_))));
        // Nothing was destroyed and nothing was exported:
        assert_eq!(store.load(date).get("1").unwrap().count(), 3);
        assert!(!export::csv_path(&reporter.export_dir, date).exists());
    }
}
