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

/**
 * Resolves the display name to record for the command author: the guild
 * nickname when there is one, the account name otherwise.
 */
pub async fn author_tag(ctx: &Context<'_>) -> String {
    match ctx.author_member().await {
        Some(member) => member.display_name().to_string(),
        None => ctx.author().name.clone(),
    }
}

#[poise::command(
    slash_command,
    prefix_command,
    description_localized("en-US", "Record help you just gave (default 1).")
)]
#[tromo::log_cmd]
pub async fn help(
    ctx: Context<'_>,
    #[description = "How many helps to record."]
    #[min = 1]
    #[max = 100]
    amount: Option<u32>,
) -> Result<(), Error> {
    let data = ctx.data();
    let delta = i64::from(amount.unwrap_or(1));
    let user_id = ctx.author().id.to_string();
    let tag = author_tag(&ctx).await;
    let today = data.store.today();

    let new_count = data.store.increment(&user_id, &tag, delta, today)?;
    let record = data.store.load(today);
    let position = aggregate::rank_of(&user_id, &record).unwrap_or(0);

    let mut responder = respond::from_ctx(ctx);
    responder
        .send(&format!(
            "✅ Đã ghi nhận **{}** lượt help cho **{}**. Hôm nay: **{}** lượt (hạng {}).",
            delta, tag, new_count, position
        ))
        .await?;

    Ok(())
}
