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
use crate::respond;
use crate::{Context, Error};
use serenity::all::User;

#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    rename = "admin-set",
    description_localized("en-US", "Overwrite a user's count for today (logs untouched).")
)]
#[tromo::log_cmd]
pub async fn admin_set(
    ctx: Context<'_>,
    #[description = "The user to correct."] user: User,
    #[description = "The new count."]
    #[min = 0]
    count: u32,
) -> Result<(), Error> {
    let data = ctx.data();
    let today = data.store.today();

    // Deliberate invariant exception: the count is overwritten without
    // touching the logs, so it may no longer match the log sum.
    data.store
        .admin_set(&user.id.to_string(), &user.name, i64::from(count), today)?;

    let mut responder = respond::from_ctx(ctx);
    responder
        .send(&format!(
            "🔧 Đã đặt số lượt help của **{}** thành **{}**.",
            user.name, count
        ))
        .await?;

    Ok(())
}

#[poise::command(
    slash_command,
    prefix_command,
    owners_only,
    rename = "admin-reset",
    description_localized("en-US", "Zero a user's count and clear their logs for today.")
)]
#[tromo::log_cmd]
pub async fn admin_reset(
    ctx: Context<'_>,
    #[description = "The user to reset."] user: User,
) -> Result<(), Error> {
    let data = ctx.data();
    let today = data.store.today();

    let mut responder = respond::from_ctx(ctx);
    match data.store.admin_reset(&user.id.to_string(), today) {
        Ok(()) => {
            responder
                .send(&format!("🧹 Đã reset số liệu hôm nay của **{}**.", user.name))
                .await?;
        }
        Err(AppError::NotFound(msg)) => {
            responder.send(&format!("⚠️ {}", msg)).await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
