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

#[poise::command(
    slash_command,
    prefix_command,
    description_localized("en-US", "Remove your most recent help entry for today.")
)]
#[tromo::log_cmd]
pub async fn undo(ctx: Context<'_>) -> Result<(), Error> {
    let data = ctx.data();
    let user_id = ctx.author().id.to_string();
    let today = data.store.today();

    let mut responder = respond::from_ctx(ctx);
    match data.store.undo(&user_id, today) {
        Ok(removed) => {
            let new_count = data
                .store
                .load(today)
                .get(&user_id)
                .map(|entry| entry.count())
                .unwrap_or(0);
            responder
                .send(&format!(
                    "↩️ Đã hoàn tác **{}** lượt help (ghi lúc {}). Còn lại: **{}** lượt.",
                    removed.delta(),
                    removed.time(),
                    new_count
                ))
                .await?;
        }
        // Nothing to undo is a user-facing notice, not a failure:
        Err(AppError::NotFound(msg)) => {
            responder.send(&format!("⚠️ {}", msg)).await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
