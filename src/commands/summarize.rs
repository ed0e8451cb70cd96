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
use crate::respond;
use crate::{Context, Error};

#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    description_localized("en-US", "Run the daily report now (optionally resetting the counts).")
)]
#[tromo::log_cmd]
pub async fn summarize(
    ctx: Context<'_>,
    #[description = "Also reset today's counts after the report."] reset: Option<bool>,
) -> Result<(), Error> {
    let data = ctx.data();
    let today = data.store.today();
    let reset_after = reset.unwrap_or(false);

    // The report may take a moment (disk + export); acknowledge first.
    let mut responder = respond::from_ctx(ctx);
    responder.defer().await?;

    let report = data
        .reporter
        .generate(today, reset_after, &mut responder)
        .await?;

    if let Some(path) = report.exported {
        responder
            .send(&format!("📄 Đã xuất báo cáo: `{}`", path.display()))
            .await?;
    }
    if reset_after {
        responder.send("🧹 Đã reset số liệu hôm nay.").await?;
    }

    Ok(())
}
