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
use crate::backup;
use crate::errors::{AppError, AppResult, ErrorLog};
use crate::report::{ChannelSink, Reporter};
use crate::store::Store;
use crate::utils::BotConfig;
use chrono::Utc;
use chrono_tz::Tz;
use cron::Schedule;
use serenity::all::{ChannelId, Http};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/**
 * Parses a cron expression, normalizing 5-field standard cron to the 7-field
 * format the `cron` crate expects (`sec min hour dom month dow year`).
 */
pub fn parse_cron(expr: &str) -> AppResult<Schedule> {
    let normalized = normalize_cron_fields(expr);
    Schedule::from_str(&normalized)
        .map_err(|e| AppError::Unknown(format!("invalid cron expression '{}': {}", expr, e)))
}

fn normalize_cron_fields(expr: &str) -> String {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    match fields.len() {
        5 => format!("0 {} *", expr),
        6 => format!("0 {}", expr),
        _ => expr.to_string(),
    }
}

/// Archive name stamp, in the configured zone.
pub fn backup_stamp(tz: Tz) -> String {
    Utc::now()
        .with_timezone(&tz)
        .format("%Y%m%d-%H%M%S")
        .to_string()
}

/**
 * Spawns the two timer jobs: the nightly report + reset at the configured
 * local time, and the periodic backup snapshot. The jobs are independent;
 * nothing prevents a manual `summarize` from overlapping the nightly run
 * (the later write wins).
 */
pub fn spawn(http: Arc<Http>, config: &BotConfig, store: Store, errors: Arc<ErrorLog>) {
    let tz = config.tz();

    match parse_cron(&config.report_cron) {
        Ok(schedule) => {
            let reporter = Reporter::new(
                store.clone(),
                PathBuf::from(&config.export_dir),
                config.column_separator.clone(),
                errors.clone(),
            );
            let channel = ChannelId::new(config.report_channel);
            let nightly_http = http.clone();
            let nightly_errors = errors.clone();
            let nightly_store = store.clone();
            tokio::spawn(async move {
                nightly_loop(
                    schedule,
                    tz,
                    reporter,
                    nightly_store,
                    nightly_http,
                    channel,
                    nightly_errors,
                )
                .await;
            });
        }
        Err(e) => {
            warn!("{}. Nightly report job disabled.", e);
            errors.push("scheduler", &e.to_string());
        }
    }

    let interval = Duration::from_secs(config.backup_interval_hours.max(1) * 3600);
    let data_dir = PathBuf::from(&config.data_dir);
    let backup_dir = PathBuf::from(&config.backup_dir);
    tokio::spawn(async move {
        backup_loop(interval, data_dir, backup_dir, tz, errors).await;
    });
}

async fn nightly_loop(
    schedule: Schedule,
    tz: Tz,
    reporter: Reporter,
    store: Store,
    http: Arc<Http>,
    channel: ChannelId,
    errors: Arc<ErrorLog>,
) {
    info!("Nightly report job started.");
    loop {
        let Some(next) = schedule.upcoming(tz).next() else {
            warn!("Report schedule has no upcoming fire time; stopping the job.");
            return;
        };
        let wait = (next.with_timezone(&Utc) - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        tokio::time::sleep(wait).await;

        let date = store.today();
        info!(%date, "Running the nightly report.");
        let mut sink = ChannelSink::new(http.clone(), channel);
        match reporter.generate(date, true, &mut sink).await {
            Ok(report) => {
                if let Some(path) = report.exported {
                    info!(path = %path.display(), "Nightly export written.");
                }
            }
            Err(e) => {
                warn!("Nightly report failed: {}", e);
                errors.push("nightly-report", &e.to_string());
            }
        }
    }
}

async fn backup_loop(
    interval: Duration,
    data_dir: PathBuf,
    backup_dir: PathBuf,
    tz: Tz,
    errors: Arc<ErrorLog>,
) {
    info!("Backup job started (every {:?}).", interval);
    loop {
        tokio::time::sleep(interval).await;
        match backup::snapshot(&data_dir, &backup_dir, &backup_stamp(tz)) {
            Ok(_) => {}
            Err(e) => {
                warn!("Backup snapshot failed: {}", e);
                errors.push("backup", &e.to_string());
            }
        }
    }
}
