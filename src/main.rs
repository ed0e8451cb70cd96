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
mod aggregate;
mod backup;
mod commands;
mod errors;
mod export;
mod http;
mod report;
mod respond;
mod scheduler;
mod store;
mod utils;

use crate::errors::ErrorLog;
use crate::report::Reporter;
use crate::store::Store;
use crate::utils::BotConfig;
use poise::serenity_prelude as serenity;
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/* Poise-required data types: */

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

// User data:
pub struct Data {
    pub config: BotConfig,
    pub store: Store,
    pub reporter: Reporter,
    pub errors: Arc<ErrorLog>,
    /// Guards the timer jobs and HTTP server against reconnects.
    jobs_started: AtomicBool,
}

async fn listen(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        // Ready (bot is started):
        serenity::FullEvent::Ready { data_about_bot, .. } => {
            info!(name = %data_about_bot.user.name, "Bot connected.");
            ctx.set_presence(None, serenity::OnlineStatus::Online);

            // Spawn the timer jobs and the HTTP server only once per
            // process; Ready fires again on every reconnect.
            if !data.jobs_started.swap(true, Ordering::SeqCst) {
                scheduler::spawn(
                    ctx.http.clone(),
                    &data.config,
                    data.store.clone(),
                    data.errors.clone(),
                );

                let state = http::HttpState {
                    errors: data.errors.clone(),
                    started: Instant::now(),
                };
                let port = data.config.http_port;
                let export_dir = PathBuf::from(&data.config.export_dir);
                let backup_dir = PathBuf::from(&data.config.backup_dir);
                tokio::spawn(async move {
                    if let Err(e) = http::serve(port, state, export_dir, backup_dir).await {
                        error!("HTTP server stopped: {}", e);
                    }
                });
            }
        }

        _ => {}
    }

    Ok(())
}

/**
 * The command-handling boundary: every failure ends up here, none of them
 * crash the process. Failures are recorded for the `errors` command and a
 * generic notice is delivered when a response is still possible.
 */
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = ctx.command().qualified_name.clone();
            tracing::error!(%command, "Command failed: {}", error);
            ctx.data().errors.push(&command, &error.to_string());
            let _ = ctx.say("❌ Có lỗi xảy ra, vui lòng thử lại sau.").await;
        }
        poise::FrameworkError::NotAnOwner { ctx, .. } => {
            // Permission failures mutate nothing and are just reported back.
            let _ = ctx.say("⛔ Lệnh này chỉ dành cho chủ bot.").await;
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let token = env::var("DISCORD_TOKEN")
        .expect("Discord token not provided (in DISCORD_TOKEN environmental variable).");
    let prefix = env::var("PREFIX").unwrap_or_else(|_| String::from("!"));
    let owners: HashSet<serenity::UserId> = env::var("OWNER_ID")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .map(serenity::UserId::new)
        .into_iter()
        .collect();

    let config = utils::load_config();
    utils::init_filesystem(&config);

    let errors = Arc::new(ErrorLog::default());
    let store = Store::new(&config.data_dir, config.tz());
    let reporter = Reporter::new(
        store.clone(),
        PathBuf::from(&config.export_dir),
        config.column_separator.clone(),
        errors.clone(),
    );

    let intents = serenity::GatewayIntents::default()
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::admin::admin_reset(),
                commands::admin::admin_set(),
                commands::broadcast::broadcast(),
                commands::clear::clear(),
                commands::errors::errors(),
                commands::export::export_csv(),
                commands::export::export_excel(),
                commands::help::help(),
                commands::leaderboard::leaderboard(),
                commands::leaderboard::weekly_top(),
                commands::ping::ping(),
                commands::stats::history(),
                commands::stats::stats(),
                commands::stats::stats_detail(),
                commands::summarize::summarize(),
                commands::undo::undo(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            owners,
            on_error: |error| Box::pin(on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(listen(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(Data {
                    config,
                    store,
                    reporter,
                    errors,
                    jobs_started: AtomicBool::new(false),
                })
            })
        })
        .build();

    let mut client = serenity::Client::builder(token, intents)
        .framework(framework) // For command handling, using poise.
        .await
        .expect("Could not create the Discord bot client object.");

    client.start().await.expect("The Discord bot crashed.");
}
