//! Daily reminder delivery: pacing, per-recipient failure isolation.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{ChatId, ParseMode};
use teloxide::Bot;
use tokio::time::sleep;

use crate::common::BotEnv;
use crate::format::{format_messages, MAX_MESSAGE_CHARS};
use crate::models::Recipient;

/// Outbound message seam, so delivery is testable without Telegram.
#[async_trait]
pub trait Messenger {
    async fn send_html(&self, chat_id: ChatId, text: &str) -> Result<()>;
}

#[async_trait]
impl Messenger for Bot {
    async fn send_html(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true)
            .await?;
        Ok(())
    }
}

/// Throttle against Telegram's rate limits, deliberate and sequential.
pub struct Pacing {
    pub between_messages: Duration,
    pub between_recipients: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_messages: Duration::from_millis(500),
            between_recipients: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

/// Send every payload to every recipient, in order. A failure for one
/// recipient is counted and logged; the run continues with the next.
pub async fn deliver(
    messenger: &(impl Messenger + Sync),
    recipients: &[Recipient],
    payloads: &[String],
    pacing: &Pacing,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for recipient in recipients {
        match send_to_recipient(messenger, recipient, payloads, pacing).await {
            Ok(()) => {
                report.sent += 1;
                log::info!(
                    "Sent reminder to {} ({})",
                    recipient.name,
                    recipient.chat_id
                );
            }
            Err(e) => {
                report.failed += 1;
                log::error!(
                    "Failed to send reminder to {}: {e:#}",
                    recipient.chat_id
                );
            }
        }
        sleep(pacing.between_recipients).await;
    }
    report
}

async fn send_to_recipient(
    messenger: &(impl Messenger + Sync),
    recipient: &Recipient,
    payloads: &[String],
    pacing: &Pacing,
) -> Result<()> {
    for payload in payloads {
        messenger.send_html(ChatId(recipient.chat_id), payload).await?;
        sleep(pacing.between_messages).await;
    }
    Ok(())
}

/// One full reminder run: fetch, format once, deliver to everyone. Empty
/// events or an empty registry end the run early with a zero report. The
/// report is logged; callers that trigger a run only get an immediate ack.
pub async fn send_daily_reminders(bot: &Bot, env: &BotEnv) -> DeliveryReport {
    log::info!("Starting daily reminder run");
    let today = Local::now().date_naive();

    let padharamanis = match env.store.padharamanis_for(today).await {
        Ok(p) => p,
        Err(e) => {
            log::error!("Failed to read today's padharamanis: {e:#}");
            return DeliveryReport::default();
        }
    };
    if padharamanis.is_empty() {
        log::info!("No padharamanis for today, skipping reminders");
        return DeliveryReport::default();
    }

    let recipients = match env.registry.list_for_delivery().await {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to read registered recipients: {e:#}");
            return DeliveryReport::default();
        }
    };
    if recipients.is_empty() {
        log::info!("No registered recipients found");
        return DeliveryReport::default();
    }

    // Formatting runs once; all recipients get the same payload sequence.
    let payloads = format_messages(&padharamanis, today, MAX_MESSAGE_CHARS);
    let report =
        deliver(bot, &recipients, &payloads, &Pacing::default()).await;
    log::info!(
        "Daily reminders completed: {} successful, {} failed",
        report.sent,
        report.failed
    );
    report
}
