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
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::str::FromStr;

/* Data structures: */

// Bot configuration struct:
/**
 * Data structure encapsulating the configuration of the bot.
 *
 * Loaded from `config.json` in the working directory; created with default
 * values on first start.
 */
#[cfg_attr(debug_assertions, derive(Debug))]
#[derive(Deserialize, Serialize, Clone)]
pub struct BotConfig {
    /// IANA identifier of the single time zone all dates and timestamps are
    /// rendered in (e.g. "Asia/Ho_Chi_Minh").
    pub timezone: String,
    /// The ID of the channel nightly reports and broadcasts are posted to.
    pub report_channel: u64,
    /// Cron expression (local time) for the nightly report + reset job.
    pub report_cron: String,
    /// Hours between two backup snapshots of the daily files.
    pub backup_interval_hours: u64,
    /// Port the liveness/health/export HTTP server listens on.
    pub http_port: u16,
    /// Directory holding one JSON file per calendar date.
    pub data_dir: String,
    /// Directory CSV/Excel exports are written to.
    pub export_dir: String,
    /// Directory backup archives are written to.
    pub backup_dir: String,
    /// The field separator used when collapsing a user's log history into a
    /// single export column.
    pub column_separator: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            timezone: String::from("Asia/Ho_Chi_Minh"),
            report_channel: 0,
            report_cron: String::from("0 0 21 * * *"),
            backup_interval_hours: 6,
            http_port: 8080,
            data_dir: String::from("data"),
            export_dir: String::from("exports"),
            backup_dir: String::from("backups"),
            column_separator: String::from(" | "),
        }
    }
}

impl BotConfig {
    /**
     * Resolves the configured time zone, falling back to Asia/Ho_Chi_Minh if
     * the identifier is unknown.
     */
    pub fn tz(&self) -> Tz {
        match Tz::from_str(&self.timezone) {
            Ok(tz) => tz,
            Err(_) => {
                tracing::warn!(
                    timezone = %self.timezone,
                    "Unknown time zone in config, falling back to Asia/Ho_Chi_Minh."
                );
                chrono_tz::Asia::Ho_Chi_Minh
            }
        }
    }
}

/**
 * Macro for logging the usage of a command as a tracing event.
 */
macro_rules! trace_cmd {
    ($ctx:ident) => {
        tracing::info!(
            command = %$ctx.invocation_string(),
            user_id = %$ctx.author().id,
            user = %$ctx.author().tag(),
            "Executing command."
        );
    };
}
pub(crate) use trace_cmd;

/// Format applied to every log-entry timestamp, in the configured zone.
pub const TIME_FORMAT: &str = "%H:%M:%S %d/%m/%Y";

/**
 * Renders an instant as a log-entry timestamp string in the given zone.
 */
pub fn format_time(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format(TIME_FORMAT).to_string()
}

/**
 * Parses an optional `YYYY-MM-DD` command argument, defaulting to today in
 * the given zone.
 */
pub fn parse_date_arg(arg: Option<&str>, tz: Tz) -> AppResult<NaiveDate> {
    match arg {
        None => Ok(Utc::now().with_timezone(&tz).date_naive()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::NotFound(format!("Ngày không hợp lệ: `{}` (YYYY-MM-DD)", raw))),
    }
}

/**
 * Loads the bot configuration from its persistent file, creating it with
 * default values if it does not exist.
 */
pub fn load_config() -> BotConfig {
    if fs::metadata("config.json").is_err() {
        let config = BotConfig::default();
        update_config_persistence(&config);
        return config;
    }
    let json = fs::read_to_string("config.json").expect("Could not read the configuration file.");
    serde_json::from_str(&json).expect("Could not parse config.json as a BotConfig object.")
}

/**
 * Updates the persistent configuration file.
 */
pub fn update_config_persistence(config: &BotConfig) {
    let json = serde_json::to_string_pretty(config)
        .expect("Could not serialize the configuration into JSON.");
    fs::write("config.json", json).expect("Could not write config.json.");
}

/**
 * Creates the directories expected for the bot to function properly.
 */
pub fn init_filesystem(config: &BotConfig) {
    fs::create_dir_all(&config.data_dir).expect("Could not create the data directory.");
    fs::create_dir_all(&config.export_dir).expect("Could not create the export directory.");
    fs::create_dir_all(&config.backup_dir).expect("Could not create the backup directory.");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_resolves_vietnam_zone() {
        let config = BotConfig::default();
        assert_eq!(config.tz(), chrono_tz::Asia::Ho_Chi_Minh);
    }

    #[test]
    fn unknown_zone_falls_back() {
        let config = BotConfig {
            timezone: String::from("Mars/Olympus_Mons"),
            ..BotConfig::default()
        };
        assert_eq!(config.tz(), chrono_tz::Asia::Ho_Chi_Minh);
    }

    #[test]
    fn date_arg_parses_iso_dates() {
        let tz = chrono_tz::Asia::Ho_Chi_Minh;
        let date = parse_date_arg(Some("2026-08-24"), tz).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
        assert!(parse_date_arg(Some("24/08/2026"), tz).is_err());
    }

    #[test]
    fn date_arg_defaults_to_today() {
        let tz = chrono_tz::Asia::Ho_Chi_Minh;
        let today = Utc::now().with_timezone(&tz).date_naive();
        assert_eq!(parse_date_arg(None, tz).unwrap(), today);
    }
}
