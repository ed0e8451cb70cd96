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
use crate::errors::AppError;
use crate::{export, respond, utils};
use crate::{Context, Error};
use std::path::{Path, PathBuf};

enum Table {
    Csv,
    Excel,
}

/**
 * Shared body of the two export commands: resolve the date, write the
 * table, report the outcome. An export failure is reported to the caller
 * but never propagated.
 */
async fn run_export(ctx: Context<'_>, date: Option<String>, table: Table) -> Result<(), Error> {
    let data = ctx.data();
    let date = utils::parse_date_arg(date.as_deref(), data.store.tz())?;
    let record = data.store.load(date);

    let mut responder = respond::from_ctx(ctx);
    if !record.has_data() {
        responder
            .send(&format!(
                "📭 Không có dữ liệu để xuất cho ngày {}.",
                date.format("%d/%m/%Y")
            ))
            .await?;
        return Ok(());
    }

    let export_dir = Path::new(&data.config.export_dir);
    let separator = &data.config.column_separator;
    let (path, result): (PathBuf, Result<(), AppError>) = match table {
        Table::Csv => {
            let path = export::csv_path(export_dir, date);
            let result = export::export_csv(&record, &path, separator);
            (path, result)
        }
        Table::Excel => {
            let path = export::xlsx_path(export_dir, date);
            let result = export::export_xlsx(&record, &path, separator);
            (path, result)
        }
    };

    match result {
        Ok(()) => {
            responder
                .send(&format!("📄 Đã xuất: `{}`", path.display()))
                .await?;
        }
        Err(e) => {
            data.errors.push("export-command", &e.to_string());
            responder
                .send(&format!("❌ Xuất thất bại: {}", e))
                .await?;
        }
    }

    Ok(())
}

#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    rename = "export-csv",
    description_localized("en-US", "Export a day's table as CSV.")
)]
#[tromo::log_cmd]
pub async fn export_csv(
    ctx: Context<'_>,
    #[description = "The date to export (YYYY-MM-DD)."] date: Option<String>,
) -> Result<(), Error> {
    run_export(ctx, date, Table::Csv).await
}

#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    rename = "export-excel",
    description_localized("en-US", "Export a day's table as an Excel sheet.")
)]
#[tromo::log_cmd]
pub async fn export_excel(
    ctx: Context<'_>,
    #[description = "The date to export (YYYY-MM-DD)."] date: Option<String>,
) -> Result<(), Error> {
    run_export(ctx, date, Table::Excel).await
}
