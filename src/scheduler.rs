//! In-process cron task driving the daily reminder run.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use cron::Schedule;
use log::debug;
use teloxide::Bot;
use tokio::select;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::common::BotEnv;
use crate::dispatch;
use crate::utils::ResultExt;

pub async fn task(bot: Bot, env: Arc<BotEnv>, shutdown: CancellationToken) {
    run(bot, env, shutdown).await.log_error("Reminder scheduler stopped");
}

async fn run(
    bot: Bot,
    env: Arc<BotEnv>,
    shutdown: CancellationToken,
) -> Result<()> {
    let schedule = Schedule::from_str(&env.config.reminders.schedule)
        .context("failed to parse reminder schedule")?;

    loop {
        let next_run =
            schedule.upcoming(Local).next().ok_or_else(|| {
                anyhow::anyhow!("no upcoming occurrence in reminder schedule")
            })?;
        debug!("Next reminder run at {next_run}");

        let wait = (next_run - Local::now()).to_std().unwrap_or_default();
        select! {
            () = shutdown.cancelled() => return Ok(()),
            () = sleep(wait) => {}
        }

        // Failures are already logged and aggregated inside the run.
        dispatch::send_daily_reminders(&bot, &env).await;
    }
}
