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
use crate::errors::{AppError, AppResult};
use crate::store::{DayRecord, UserEntry};
use chrono::NaiveDate;
use csv::Writer;
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

const HEADERS: [&str; 4] = ["rank", "tag", "total", "logs"];

/**
 * Collapses a user's log history into one cell:
 * `"<delta> help lúc <time>"` entries joined by the configured separator.
 */
pub fn collapse_logs(entry: &UserEntry, separator: &str) -> String {
    entry
        .logs()
        .iter()
        .map(|log| format!("{} help lúc {}", log.delta(), log.time()))
        .collect::<Vec<_>>()
        .join(separator)
}

/// Deterministic export file name for a date.
pub fn csv_path(export_dir: &Path, date: NaiveDate) -> PathBuf {
    export_dir.join(format!("help-report-{}.csv", date.format("%Y-%m-%d")))
}

pub fn xlsx_path(export_dir: &Path, date: NaiveDate) -> PathBuf {
    export_dir.join(format!("help-report-{}.xlsx", date.format("%Y-%m-%d")))
}

/**
 * Writes the ranked day table as CSV.
 */
pub fn export_csv(record: &DayRecord, path: &Path, separator: &str) -> AppResult<()> {
    let mut wtr = Writer::from_path(path).map_err(|e| AppError::Export(e.to_string()))?;

    wtr.write_record(HEADERS)
        .map_err(|e| AppError::Export(e.to_string()))?;

    for (position, (_, entry)) in aggregate::rank(record).iter().enumerate() {
        wtr.write_record(&[
            (position + 1).to_string(),
            entry.tag().clone(),
            entry.count().to_string(),
            collapse_logs(entry, separator),
        ])
        .map_err(|e| AppError::Export(e.to_string()))?;
    }

    wtr.flush().map_err(|e| AppError::Export(e.to_string()))?;
    Ok(())
}

/**
 * Writes the ranked day table as an Excel sheet: bold header row, column
 * widths sized to the longest cell.
 */
pub fn export_xlsx(record: &DayRecord, path: &Path, separator: &str) -> AppResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| AppError::Export(e.to_string()))?;
    }

    let mut col_widths: Vec<usize> = HEADERS.iter().map(|h| h.len()).collect();

    for (position, (_, entry)) in aggregate::rank(record).iter().enumerate() {
        let row = (position + 1) as u32;
        let values = [
            (position + 1).to_string(),
            entry.tag().clone(),
            entry.count().to_string(),
            collapse_logs(entry, separator),
        ];
        for (col, value) in values.iter().enumerate() {
            worksheet
                .write(row, col as u16, value.as_str())
                .map_err(|e| AppError::Export(e.to_string()))?;
            col_widths[col] = col_widths[col].max(value.chars().count());
        }
    }

    for (col, width) in col_widths.iter().enumerate() {
        worksheet
            .set_column_width(col as u16, *width as f64 + 2.0)
            .map_err(|e| AppError::Export(e.to_string()))?;
    }

    let path_str = path
        .to_str()
        .ok_or_else(|| AppError::Export(String::from("invalid export path")))?;
    workbook
        .save(path_str)
        .map_err(|e| AppError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    fn populated_record() -> (tempfile::TempDir, Store, DayRecord, NaiveDate) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path(), chrono_tz::Asia::Ho_Chi_Minh);
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        store.increment("1", "An", 3, date).unwrap();
        store.increment("1", "An", 2, date).unwrap();
        store.increment("2", "Bình", 4, date).unwrap();
        let record = store.load(date);
        (dir, store, record, date)
    }

    #[test]
    fn collapsed_logs_join_with_separator() {
        let (_dir, _store, record, _date) = populated_record();
        let collapsed = collapse_logs(record.get("1").unwrap(), " | ");
        assert!(collapsed.starts_with("3 help lúc "));
        assert!(collapsed.contains(" | 2 help lúc "));
    }

    #[test]
    fn csv_contains_ranked_rows() {
        let (dir, _store, record, date) = populated_record();
        let path = csv_path(dir.path(), date);
        export_csv(&record, &path, " | ").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "rank,tag,total,logs");
        assert!(lines[1].starts_with("1,An,5,")); // 5 beats 4
        assert!(lines[2].starts_with("2,Bình,4,"));
    }

    #[test]
    fn export_paths_are_date_deterministic() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let dir = Path::new("exports");
        assert_eq!(
            csv_path(dir, date),
            PathBuf::from("exports/help-report-2026-08-24.csv")
        );
        assert_eq!(
            xlsx_path(dir, date),
            PathBuf::from("exports/help-report-2026-08-24.xlsx")
        );
    }

    #[test]
    fn xlsx_export_writes_a_file() {
        let (dir, _store, record, date) = populated_record();
        let path = xlsx_path(dir.path(), date);
        export_xlsx(&record, &path, " | ").unwrap();
        assert!(path.exists());
    }
}
