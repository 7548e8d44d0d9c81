//! `rcinfo bot` – chat bot long-polling loop.

use anyhow::{Context, Result};
use rcinfo_core::bot::{run_polling, Bot, BotSettings, TelegramApi};
use rcinfo_core::config::RcConfig;
use rcinfo_core::lookup::RcApiClient;
use rcinfo_core::quota::{JsonFileBackend, QuotaStore};
use std::sync::Arc;

pub async fn run_bot(cfg: &RcConfig) -> Result<()> {
    let token = cfg
        .bot
        .token
        .as_deref()
        .context("TELEGRAM_BOT_TOKEN is not set (environment or [bot] token in config)")?;
    if cfg.bot.admin_id.is_none() {
        tracing::warn!("no admin id configured; /addpremium and /removepremium are disabled");
    }

    let quota_path = cfg.quota_path()?;
    let store = QuotaStore::new(JsonFileBackend::new(&quota_path), cfg.quota);
    let api = Arc::new(TelegramApi::new(
        &cfg.bot.api_base,
        token,
        cfg.bot.poll_timeout_secs,
    ));
    let lookup = RcApiClient::new(cfg.upstream.api_url.clone(), cfg.upstream.timeouts());
    let bot = Bot::new(
        Arc::clone(&api),
        lookup,
        store,
        BotSettings::from_config(&cfg.bot),
    );

    tracing::info!(quota = %quota_path.display(), "vehicle info bot starting");
    println!("Vehicle Info Bot is running (Ctrl+C to stop)");
    run_polling(api, Arc::new(bot)).await
}
