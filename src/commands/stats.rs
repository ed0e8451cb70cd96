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
use crate::{aggregate, export, respond, utils};
use crate::{Context, Error};
use serenity::all::User;
use std::fmt::Write as _;

/// Discord caps message bodies at 2000 characters.
const MAX_REPLY: usize = 1900;

fn truncate_reply(mut reply: String) -> String {
    if reply.chars().count() > MAX_REPLY {
        reply = reply.chars().take(MAX_REPLY).collect();
        reply.push_str("\n…");
    }
    reply
}

#[poise::command(
    slash_command,
    prefix_command,
    description_localized("en-US", "Show one user's help count for a date (default: you, today).")
)]
#[tromo::log_cmd]
pub async fn stats(
    ctx: Context<'_>,
    #[description = "The user to look up."] user: Option<User>,
    #[description = "The date to look up (YYYY-MM-DD)."] date: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let target = user.as_ref().unwrap_or_else(|| ctx.author());
    let date = utils::parse_date_arg(date.as_deref(), data.store.tz())?;

    let record = data.store.load(date);
    let reply = match record.get(&target.id.to_string()) {
        Some(entry) => format!(
            "📈 **{}** — **{}** lượt help ngày {} (hạng {}).",
            entry.tag(),
            entry.count(),
            date.format("%d/%m/%Y"),
            aggregate::rank_of(&target.id.to_string(), &record).unwrap_or(0)
        ),
        None => format!(
            "📭 **{}** chưa có lượt help nào ngày {}.",
            target.name,
            date.format("%d/%m/%Y")
        ),
    };

    let mut responder = respond::from_ctx(ctx);
    responder.send(&reply).await?;

    Ok(())
}

#[poise::command(
    slash_command,
    prefix_command,
    rename = "stats-detail",
    description_localized("en-US", "Full per-user listing with log history for a date.")
)]
#[tromo::log_cmd]
pub async fn stats_detail(
    ctx: Context<'_>,
    #[description = "The date to look up (YYYY-MM-DD)."] date: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let date = utils::parse_date_arg(date.as_deref(), data.store.tz())?;
    let record = data.store.load(date);

    let mut responder = respond::from_ctx(ctx);
    if !record.has_data() {
        responder
            .send(&format!(
                "📭 Không có dữ liệu ngày {}.",
                date.format("%d/%m/%Y")
            ))
            .await?;
        return Ok(());
    }

    let mut reply = format!("📋 **Chi tiết ngày {}**\n", date.format("%d/%m/%Y"));
    for (_, entry) in aggregate::rank(&record) {
        writeln!(&mut reply, "**{}** — {} lượt", entry.tag(), entry.count()).unwrap();
        let collapsed = export::collapse_logs(entry, "\n  • ");
        if !collapsed.is_empty() {
            writeln!(&mut reply, "  • {}", collapsed).unwrap();
        }
    }

    responder.send(&truncate_reply(reply)).await?;

    Ok(())
}

#[poise::command(
    slash_command,
    prefix_command,
    description_localized("en-US", "Your raw help log for a date (default today).")
)]
#[tromo::log_cmd]
pub async fn history(
    ctx: Context<'_>,
    #[description = "The date to look up (YYYY-MM-DD)."] date: Option<String>,
) -> Result<(), Error> {
    let data = ctx.data();
    let date = utils::parse_date_arg(date.as_deref(), data.store.tz())?;
    let record = data.store.load(date);

    let reply = match record.get(&ctx.author().id.to_string()) {
        Some(entry) if !entry.logs().is_empty() => {
            let mut reply = format!("🗒️ **Lịch sử ngày {}**\n", date.format("%d/%m/%Y"));
            for log in entry.logs() {
                writeln!(&mut reply, "• {} help lúc {}", log.delta(), log.time()).unwrap();
            }
            truncate_reply(reply)
        }
        _ => format!(
            "📭 Bạn chưa có lượt help nào ngày {}.",
            date.format("%d/%m/%Y")
        ),
    };

    let mut responder = respond::from_ctx(ctx);
    responder.send(&reply).await?;

    Ok(())
}
