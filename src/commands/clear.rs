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
use serenity::all::GetMessages;

#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    guild_only,
    description_localized("en-US", "Bulk-delete recent messages in this channel.")
)]
#[tromo::log_cmd]
pub async fn clear(
    ctx: Context<'_>,
    #[description = "How many messages to delete."]
    #[min = 1]
    #[max = 100]
    amount: u32,
) -> Result<(), Error> {
    let channel = ctx.channel_id();
    let messages = channel
        .messages(ctx.http(), GetMessages::new().limit(amount as u8))
        .await?;
    let ids: Vec<_> = messages.iter().map(|m| m.id).collect();
    let deleted = ids.len();

    if !ids.is_empty() {
        channel.delete_messages(ctx.http(), ids).await?;
    }

    let mut responder = respond::from_ctx(ctx);
    responder
        .send(&format!("🧹 Đã xoá {} tin nhắn.", deleted))
        .await?;

    Ok(())
}
