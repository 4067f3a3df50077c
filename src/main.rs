#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// False positives
#![allow(clippy::needless_pass_by_value)] // for dptree handlers
// Style
#![allow(clippy::items_after_statements)]

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::sync::Arc;

use anyhow::Result;
use argh::FromArgs;
use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::common::BotEnv;
use crate::registry::Registry;
use crate::secrets::SecretStore;
use crate::sheets::SheetsClient;
use crate::store::PadharamaniStore;

mod common;
mod config;
mod dispatch;
mod format;
mod models;
mod modules;
mod registry;
mod scheduler;
mod secrets;
mod sheets;
mod store;
mod utils;
mod web_srv;

/// padharamani reminder bot
#[derive(FromArgs, PartialEq, Debug)]
struct Args {
    /// config file
    #[argh(positional)]
    config_file: OsString,
}

#[tokio::main]
async fn main() -> Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();
    let args: Args = argh::from_env();
    run_bot(&args.config_file).await
}

async fn run_bot(config_fpath: &OsStr) -> Result<()> {
    let config: config::Config =
        serde_yaml::from_reader(File::open(config_fpath)?)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))?;
    let config = Arc::new(config);

    let http = reqwest::Client::new();
    let secrets = SecretStore::new(config.secret_manager.clone(), http.clone());
    let bot_token = secrets
        .resolve("telegram-bot-token", config.telegram.token.as_deref())
        .await?;
    let sheets_token = secrets
        .resolve("sheets-api-token", config.sheets.token.as_deref())
        .await?;
    let events_spreadsheet = secrets
        .resolve("google-sheet-id", config.sheets.events_spreadsheet.as_deref())
        .await?;
    let recipients_spreadsheet = secrets
        .resolve(
            "telegram-users-sheet-id",
            config.sheets.recipients_spreadsheet.as_deref(),
        )
        .await?;

    let store = Arc::new(PadharamaniStore::new(
        SheetsClient::connect(http, &config.sheets.api_base, &sheets_token)?,
        events_spreadsheet,
        recipients_spreadsheet,
    ));
    // Initialization failures propagate; the bot must not start against a
    // half-initialized store.
    store.ensure_recipients_header().await?;

    let bot_env = Arc::new(BotEnv {
        config: Arc::clone(&config),
        store: Arc::clone(&store),
        registry: Registry::new(store),
    });

    let bot = Bot::new(bot_token);

    let mut dispatcher = Dispatcher::builder(
        bot.clone(),
        Update::filter_message()
            .branch(modules::basic::command_handler())
            .endpoint(drop_endpoint),
    )
    .dependencies(dptree::deps![Arc::clone(&bot_env)])
    .build();
    let bot_shutdown_token = dispatcher.shutdown_token();

    let cancel = CancellationToken::new();
    let mut join_handles = Vec::new();
    join_handles.push(tokio::spawn(async move { dispatcher.dispatch().await }));
    join_handles.push(tokio::spawn(scheduler::task(
        bot.clone(),
        Arc::clone(&bot_env),
        cancel.clone(),
    )));
    join_handles.push(tokio::spawn(web_srv::run(
        bot,
        bot_env,
        config.server_addr,
        cancel.clone(),
    )));

    run_signal_handler(bot_shutdown_token, cancel);

    futures::future::join_all(join_handles).await;

    Ok(())
}

async fn drop_endpoint() -> Result<()> {
    Ok(())
}

fn run_signal_handler(
    bot_shutdown_token: teloxide::dispatching::ShutdownToken,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        loop {
            tokio::signal::ctrl_c().await.expect("Failed to listen for SIGINT");
            cancel.cancel();
            match bot_shutdown_token.shutdown() {
                Ok(f) => {
                    log::info!(
                        "^C received, trying to shutdown the dispatcher..."
                    );
                    tokio::select! {
                        () = f => {
                            log::info!("dispatcher is shutdown...");
                        }
                        _ = tokio::signal::ctrl_c() => {
                            log::info!("Got another ^C, exiting immediately");
                            std::process::exit(0);
                        }
                    }
                }
                Err(_) => {
                    log::info!("^C received, the dispatcher isn't running, ignoring the signal");
                }
            }
        }
    });
}
