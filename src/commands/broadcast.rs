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
use serenity::all::ChannelId;

#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    description_localized("en-US", "Post a message to the report channel.")
)]
#[tromo::log_cmd]
pub async fn broadcast(
    ctx: Context<'_>,
    #[description = "The text to post."]
    #[rest]
    text: String,
) -> Result<(), Error> {
    let data = ctx.data();
    let channel = ChannelId::new(data.config.report_channel);

    let mut responder = respond::from_ctx(ctx);
    match channel.say(ctx.http(), &text).await {
        Ok(_) => {
            responder.send("📣 Đã gửi thông báo.").await?;
        }
        Err(e) => {
            data.errors.push("broadcast", &e.to_string());
            responder
                .send(&format!("❌ Không gửi được thông báo: {}", e))
                .await?;
        }
    }

    Ok(())
}
