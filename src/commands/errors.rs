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
use std::fmt::Write as _;

#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    aliases("logs"),
    description_localized("en-US", "Show the most recent recorded failures.")
)]
#[tromo::log_cmd]
pub async fn errors(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let entries = data.errors.recent(15);

    let mut responder = respond::from_ctx(ctx);
    if entries.is_empty() {
        responder.send("✅ Chưa có lỗi nào được ghi nhận.").await?;
        return Ok(());
    }

    let mut reply = format!("🧾 **{} lỗi gần nhất**\n", entries.len());
    for entry in entries {
        writeln!(
            &mut reply,
            "`{}` [{}] {}",
            entry.when.format("%H:%M:%S %d/%m"),
            entry.context,
            entry.message
        )
        .unwrap();
    }
    responder.send(&reply).await?;

    Ok(())
}
