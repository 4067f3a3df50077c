//! User-facing commands: /start, /register, /today, /help.

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

use crate::common::{BotEnv, UpdateHandler};
use crate::format::{format_messages, MAX_MESSAGE_CHARS};
use crate::registry::RegisterOutcome;
use crate::utils::BotExt;

const WELCOME_TEXT: &str = "\
🙏 Welcome to Sant Padharamani Bot!

This bot sends daily reminders about scheduled padharamanis.

Available commands:
/register - Register to receive daily reminders
/today - Get today's padharamanis
/help - Show this help message

To register for daily reminders, use the /register command.";

const HELP_TEXT: &str = "\
🤖 Sant Padharamani Bot Help

Available commands:
/start - Welcome message and overview
/register - Register to receive daily reminders at 1:00 AM
/today - Get today's scheduled padharamanis
/help - Show this help message

📅 Daily Reminders:
Registered users automatically receive reminders at 1:00 AM with details \
about the day's scheduled padharamanis.

📞 Contact Information:
Each reminder includes phone numbers and addresses that you can tap to \
call or get directions.

🔄 Updates:
The bot gets the latest information from the Sant Padharamani dashboard.";

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
enum Command {
    #[command(description = "welcome message and overview.")]
    Start,
    #[command(description = "register to receive daily reminders.")]
    Register,
    #[command(description = "get today's padharamanis.")]
    Today,
    #[command(description = "show the help message.")]
    Help,
}

pub fn command_handler() -> UpdateHandler {
    dptree::entry().filter_command::<Command>().endpoint(handle_command)
}

async fn handle_command(
    bot: Bot,
    env: Arc<BotEnv>,
    msg: Message,
    command: Command,
) -> Result<()> {
    match command {
        Command::Start => {
            bot.reply_message(&msg, WELCOME_TEXT).await?;
        }
        Command::Register => cmd_register(bot, env, msg).await?,
        Command::Today => cmd_today(bot, env, msg).await?,
        Command::Help => {
            bot.reply_message(&msg, HELP_TEXT).await?;
        }
    }
    Ok(())
}

/// Handle `/register`. Store failures are logged in full and answered with
/// a generic apology; they never abort the dispatcher.
async fn cmd_register(bot: Bot, env: Arc<BotEnv>, msg: Message) -> Result<()> {
    let name = msg
        .from()
        .map_or_else(|| "Unknown".to_string(), |user| user.full_name());

    let reply = match env.registry.register(msg.chat.id.0, &name).await {
        Ok(RegisterOutcome::Registered) => format!(
            "✅ Registration successful!\n\n\
             Hello {name}, you have been registered to receive daily \
             padharamani reminders at 1:00 AM.\n\n\
             You can use /today to get today's padharamanis anytime."
        ),
        Ok(RegisterOutcome::AlreadyRegistered) => {
            "ℹ️ You are already registered for daily reminders.\n\n\
             Use /today to get today's padharamanis."
                .to_string()
        }
        Err(e) => {
            log::error!("Failed to register {}: {e:#}", msg.chat.id);
            "❌ Registration failed. Please try again later.".to_string()
        }
    };
    bot.reply_message(&msg, reply).await?;
    Ok(())
}

/// Handle `/today`: fetch, format, and reply each payload in order.
async fn cmd_today(bot: Bot, env: Arc<BotEnv>, msg: Message) -> Result<()> {
    let today = Local::now().date_naive();
    match env.store.padharamanis_for(today).await {
        Ok(padharamanis) if padharamanis.is_empty() => {
            bot.reply_message(&msg, "📅 No padharamanis scheduled for today.")
                .await?;
        }
        Ok(padharamanis) => {
            for payload in
                format_messages(&padharamanis, today, MAX_MESSAGE_CHARS)
            {
                bot.reply_message(&msg, payload)
                    .parse_mode(ParseMode::Html)
                    .disable_web_page_preview(true)
                    .await?;
            }
        }
        Err(e) => {
            log::error!("Failed to get today's padharamanis: {e:#}");
            bot.reply_message(
                &msg,
                "❌ Failed to get today's padharamanis. Please try again \
                 later.",
            )
            .await?;
        }
    }
    Ok(())
}
