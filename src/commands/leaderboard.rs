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
use crate::{aggregate, respond};
use crate::{Context, Error};
use std::fmt::Write as _;

#[poise::command(
    slash_command,
    prefix_command,
    description_localized("en-US", "Today's help leaderboard.")
)]
#[tromo::log_cmd]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let record = data.store.load(data.store.today());
    let summary = data.reporter.render(&record);

    let mut responder = respond::from_ctx(ctx);
    responder.send(&summary).await?;

    Ok(())
}

#[poise::command(
    slash_command,
    prefix_command,
    rename = "weekly-top",
    description_localized("en-US", "Help ranking over the last 7 days.")
)]
#[tromo::log_cmd]
pub async fn weekly_top(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let anchor = data.store.today();
    let totals = aggregate::weekly_totals(&data.store, anchor);

    let mut responder = respond::from_ctx(ctx);
    if totals.is_empty() {
        responder
            .send("📭 Không có lượt help nào trong 7 ngày qua.")
            .await?;
        return Ok(());
    }

    let mut reply = String::from("🏆 **Bảng xếp hạng 7 ngày gần nhất**\n");
    for (position, (_, entry)) in aggregate::rank_weekly(&totals).iter().take(10).enumerate() {
        writeln!(
            &mut reply,
            "{}. **{}** — {} lượt help",
            position + 1,
            entry.tag(),
            entry.count()
        )
        .unwrap();
    }
    responder.send(&reply).await?;

    Ok(())
}
