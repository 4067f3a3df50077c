use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Config {
    pub telegram: Telegram,
    pub server_addr: SocketAddr,
    pub sheets: Sheets,
    #[serde(default)]
    pub secret_manager: Option<SecretManager>,
    #[serde(default)]
    pub reminders: Reminders,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Telegram {
    /// Literal bot token; used as a fallback when the secret
    /// `telegram-bot-token` cannot be resolved remotely.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Sheets {
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub events_spreadsheet: Option<String>,
    #[serde(default)]
    pub recipients_spreadsheet: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SecretManager {
    #[serde(default = "default_secret_manager_api_base")]
    pub api_base: String,
    pub project: String,
    pub access_token: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Reminders {
    /// Cron expression with seconds field; default fires daily at 01:00.
    #[serde(default = "default_reminder_schedule")]
    pub schedule: String,
}

impl Default for Reminders {
    fn default() -> Self {
        Self { schedule: default_reminder_schedule() }
    }
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_secret_manager_api_base() -> String {
    "https://secretmanager.googleapis.com".to_string()
}

fn default_reminder_schedule() -> String {
    "0 0 1 * * *".to_string()
}
