//! Chat bot adapter.
//!
//! [`Bot::handle`] answers one incoming message through a [`ChatApi`]. It is
//! blocking and safe to call from many threads at once; quota updates for the
//! same user are serialized by the [`QuotaStore`].
//!
//! Lookup flow for a registration number:
//! quota check, "searching" notice, fetch, optional photo, usage recorded,
//! details with the remaining count.

mod command;
mod telegram;

use anyhow::Result;

use crate::config::BotConfig;
use crate::error::LookupError;
use crate::lookup::VehicleLookup;
use crate::quota::{QuotaBackend, QuotaRecord, QuotaStore};
use crate::regno::{RegNo, FORMAT_HINT, INVALID_INPUT};
use crate::render::{chat::details_html, escape_html};
use crate::shape::{shape_record, Layout};

pub use command::{parse, Command};
pub use telegram::{run_polling, TelegramApi, Update};

const SEARCHING: &str = "🔍 Searching for vehicle details...";
const NOT_AUTHORIZED: &str = "⚠️ You are not authorized to use this command.";
const GENERIC_FAILURE: &str = "Failed to fetch vehicle details. Please try again later.";

/// Outgoing side of a chat transport.
pub trait ChatApi: Send + Sync {
    fn send_message(&self, chat_id: &str, text: &str, html: bool) -> Result<()>;
    fn send_photo(&self, chat_id: &str, photo_url: &str, caption: &str) -> Result<()>;
}

impl<T: ChatApi + ?Sized> ChatApi for std::sync::Arc<T> {
    fn send_message(&self, chat_id: &str, text: &str, html: bool) -> Result<()> {
        (**self).send_message(chat_id, text, html)
    }

    fn send_photo(&self, chat_id: &str, photo_url: &str, caption: &str) -> Result<()> {
        (**self).send_photo(chat_id, photo_url, caption)
    }
}

/// One text message from a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: String,
    pub user_id: String,
    pub text: String,
}

/// Admin identity and the upsell wording.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub admin_id: Option<String>,
    pub contact_handle: String,
    pub premium_price: String,
}

impl BotSettings {
    pub fn from_config(cfg: &BotConfig) -> Self {
        Self {
            admin_id: cfg.admin_id.clone(),
            contact_handle: cfg.contact_handle.clone(),
            premium_price: cfg.premium_price.clone(),
        }
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self::from_config(&BotConfig::default())
    }
}

pub struct Bot<C, L, B> {
    chat: C,
    lookup: L,
    quota: QuotaStore<B>,
    settings: BotSettings,
}

impl<C, L, B> Bot<C, L, B>
where
    C: ChatApi,
    L: VehicleLookup,
    B: QuotaBackend,
{
    pub fn new(chat: C, lookup: L, quota: QuotaStore<B>, settings: BotSettings) -> Self {
        Self {
            chat,
            lookup,
            quota,
            settings,
        }
    }

    pub fn quota(&self) -> &QuotaStore<B> {
        &self.quota
    }

    /// Answer one message. Errors are chat transport failures only.
    pub fn handle(&self, msg: &IncomingMessage) -> Result<()> {
        match parse(&msg.text) {
            Command::Start => self.start(msg),
            Command::AddPremium(target) => self.add_premium(msg, target.as_deref()),
            Command::RemovePremium(target) => self.remove_premium(msg, target.as_deref()),
            Command::Quota => self.show_quota(msg),
            Command::Lookup(reg) => self.lookup(msg, &reg),
            Command::Invalid => self.reply(msg, &format!("⚠️ {INVALID_INPUT}\n\n{FORMAT_HINT}")),
            Command::Unknown => {
                tracing::debug!(user = %msg.user_id, text = %msg.text, "ignoring unknown command");
                Ok(())
            }
        }
    }

    fn reply(&self, msg: &IncomingMessage, text: &str) -> Result<()> {
        self.chat.send_message(&msg.chat_id, text, false)
    }

    /// "50 searches for ₹50"
    fn offer(&self) -> String {
        format!(
            "{} searches for {}",
            self.quota.policy().premium_searches,
            self.settings.premium_price
        )
    }

    fn is_admin(&self, msg: &IncomingMessage) -> bool {
        self.settings.admin_id.as_deref() == Some(msg.user_id.as_str())
    }

    fn start(&self, msg: &IncomingMessage) -> Result<()> {
        let rec = match self.quota.get_quota(&msg.user_id) {
            Ok(rec) => rec,
            Err(e) => return self.storage_failure(msg, &e.into()),
        };
        let text = if rec.is_premium {
            format!(
                "Welcome to Vehicle Info Bot! 🚗\n\n\
                 You have {} premium searches remaining.\n\n\
                 Send me a vehicle registration number to get detailed information about the vehicle.\n\n\
                 Example: JK03N1234",
                rec.remaining_searches
            )
        } else {
            format!(
                "Welcome to Vehicle Info Bot! 🚗\n\n\
                 You have {} free searches to try the service.\n\n\
                 Send me a vehicle registration number to get detailed information about the vehicle.\n\n\
                 Example: JK03N1234\n\n\
                 For premium access ({}), contact {}",
                rec.remaining_searches,
                self.offer(),
                self.settings.contact_handle
            )
        };
        self.reply(msg, &text)
    }

    fn add_premium(&self, msg: &IncomingMessage, target: Option<&str>) -> Result<()> {
        if !self.is_admin(msg) {
            tracing::warn!(user = %msg.user_id, "unauthorized /addpremium");
            return self.reply(msg, NOT_AUTHORIZED);
        }
        let Some(target) = target else {
            return self.reply(msg, "Usage: /addpremium <user_id>");
        };
        match self.quota.grant_default_premium(target) {
            Ok(rec) => {
                self.reply(
                    msg,
                    &format!("✅ Successfully added premium access for user {target}"),
                )?;
                let notice = format!(
                    "🎉 Premium access activated! You now have {} searches available.",
                    rec.remaining_searches
                );
                // The user may never have opened a chat with the bot.
                if let Err(e) = self.chat.send_message(target, &notice, false) {
                    tracing::warn!(user = target, error = %format!("{e:#}"), "premium notice not delivered");
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!(user = target, error = %e, "grant premium failed");
                self.reply(msg, &format!("❌ Failed to add premium user: {e}"))
            }
        }
    }

    fn remove_premium(&self, msg: &IncomingMessage, target: Option<&str>) -> Result<()> {
        if !self.is_admin(msg) {
            tracing::warn!(user = %msg.user_id, "unauthorized /removepremium");
            return self.reply(msg, NOT_AUTHORIZED);
        }
        let Some(target) = target else {
            return self.reply(msg, "Usage: /removepremium <user_id>");
        };
        match self.quota.revoke_premium(target) {
            Ok(()) => self.reply(msg, &format!("✅ Premium access removed for user {target}")),
            Err(e) => {
                tracing::error!(user = target, error = %e, "revoke premium failed");
                self.reply(msg, &format!("❌ Failed to remove premium user: {e}"))
            }
        }
    }

    fn show_quota(&self, msg: &IncomingMessage) -> Result<()> {
        match self.quota.get_quota(&msg.user_id) {
            Ok(rec) => {
                let plan = if rec.is_premium { "Premium 🌟" } else { "Free" };
                self.reply(
                    msg,
                    &format!(
                        "📊 Plan: {plan}\nSearches used: {}\nSearches remaining: {}",
                        rec.searches_used, rec.remaining_searches
                    ),
                )
            }
            Err(e) => self.storage_failure(msg, &e.into()),
        }
    }

    fn lookup(&self, msg: &IncomingMessage, reg: &RegNo) -> Result<()> {
        let user = msg.user_id.as_str();
        match self.quota.ensure_remaining(user) {
            Ok(_) => {}
            Err(LookupError::QuotaExhausted { remaining }) => {
                tracing::info!(user, remaining, "search rejected, quota exhausted");
                return self.reply(
                    msg,
                    &format!(
                        "⚠️ You have used all your searches.\n\n\
                         For premium access ({}), please contact {}",
                        self.offer(),
                        self.settings.contact_handle
                    ),
                );
            }
            Err(e) => return self.storage_failure(msg, &e),
        }

        self.reply(msg, SEARCHING)?;

        let record = match self.lookup.fetch(reg) {
            Ok(record) => record,
            Err(e @ LookupError::Storage(_)) => return self.storage_failure(msg, &e),
            Err(e) => return self.reply(msg, &format!("❌ Error: {e}")),
        };

        if let Some(image) = record.model_image_url() {
            let caption = format!("{}\n{}", record.make_and_model(), reg);
            if let Err(e) = self.chat.send_photo(&msg.chat_id, &image, &caption) {
                tracing::warn!(%reg, error = %format!("{e:#}"), "vehicle photo not sent");
            }
        }

        let updated = match self.quota.record_usage(user) {
            Ok(rec) => rec,
            Err(e) => return self.storage_failure(msg, &e.into()),
        };

        let sections = shape_record(&record, Layout::Chat, Layout::Chat.default_mask_mode());
        let text = format!(
            "{}{}\n\nBot By {}",
            details_html(&sections),
            self.remaining_line(&updated),
            escape_html(&self.settings.contact_handle)
        );
        self.chat.send_message(&msg.chat_id, &text, true)
    }

    fn remaining_line(&self, rec: &QuotaRecord) -> String {
        if rec.is_premium {
            format!("\n\n🌟 Premium Searches Remaining: {}", rec.remaining_searches)
        } else {
            format!(
                "\n\n📝 Free Searches Remaining: {}\nFor premium access ({}), contact {}",
                rec.remaining_searches,
                escape_html(&self.offer()),
                escape_html(&self.settings.contact_handle)
            )
        }
    }

    /// Log the storage fault and tell the user something generic.
    fn storage_failure(&self, msg: &IncomingMessage, e: &LookupError) -> Result<()> {
        tracing::error!(user = %msg.user_id, error = %e, "quota store failure");
        self.reply(msg, &format!("❌ Error: {GENERIC_FAILURE}"))
    }
}
