//! Telegram Bot API over curl: long-polling `getUpdates`, `sendMessage`, `sendPhoto`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{Bot, ChatApi, IncomingMessage};
use crate::http::{self, Timeouts};
use crate::lookup::VehicleLookup;
use crate::quota::QuotaBackend;

/// Pause after a failed poll before trying again.
const POLL_BACKOFF: Duration = Duration::from_secs(3);

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    from: Option<User>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Clone, Deserialize)]
struct User {
    id: i64,
}

impl Update {
    /// Text message with a known sender, if this update is one.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let msg = self.message?;
        let from = msg.from?;
        let text = msg.text?;
        Some(IncomingMessage {
            chat_id: msg.chat.id.to_string(),
            user_id: from.id.to_string(),
            text,
        })
    }
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

pub struct TelegramApi {
    base_url: String,
    poll_timeout_secs: u64,
    timeouts: Timeouts,
}

impl TelegramApi {
    /// `api_base` is e.g. `https://api.telegram.org`.
    pub fn new(api_base: &str, token: &str, poll_timeout_secs: u64) -> Self {
        Self {
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
            poll_timeout_secs,
            timeouts: Timeouts::default(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    fn call<B, T>(&self, method: &str, body: &B, timeouts: Timeouts) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body)?;
        let resp = http::post_json(&self.method_url(method), &payload, timeouts)?;
        parse_response(method, &resp.body)
    }

    /// Long-poll for updates after `offset`.
    pub fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>> {
        let body = GetUpdates {
            offset,
            timeout: self.poll_timeout_secs,
            allowed_updates: ["message"],
        };
        let timeouts = Timeouts {
            connect: self.timeouts.connect,
            total: Duration::from_secs(self.poll_timeout_secs) + self.timeouts.total,
        };
        self.call("getUpdates", &body, timeouts)
    }
}

impl ChatApi for TelegramApi {
    fn send_message(&self, chat_id: &str, text: &str, html: bool) -> Result<()> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if html {
            body["parse_mode"] = json!("HTML");
        }
        let _: serde_json::Value = self.call("sendMessage", &body, self.timeouts)?;
        Ok(())
    }

    fn send_photo(&self, chat_id: &str, photo_url: &str, caption: &str) -> Result<()> {
        let body = json!({ "chat_id": chat_id, "photo": photo_url, "caption": caption });
        let _: serde_json::Value = self.call("sendPhoto", &body, self.timeouts)?;
        Ok(())
    }
}

fn parse_response<T: DeserializeOwned>(method: &str, body: &[u8]) -> Result<T> {
    let resp: ApiResponse<T> =
        serde_json::from_slice(body).with_context(|| format!("{method}: malformed response"))?;
    if !resp.ok {
        bail!(
            "{method}: {}",
            resp.description.as_deref().unwrap_or("request rejected")
        );
    }
    resp.result
        .with_context(|| format!("{method}: response has no result"))
}

/// Poll for updates until Ctrl+C/SIGTERM, handling each message on its own
/// blocking task.
pub async fn run_polling<L, B>(
    api: Arc<TelegramApi>,
    bot: Arc<Bot<Arc<TelegramApi>, L, B>>,
) -> Result<()>
where
    L: VehicleLookup + 'static,
    B: QuotaBackend + 'static,
{
    let shutdown = crate::web::shutdown_signal();
    tokio::pin!(shutdown);
    let mut offset: Option<i64> = None;
    tracing::info!("bot polling started");

    loop {
        let poll_api = Arc::clone(&api);
        let poll = tokio::task::spawn_blocking(move || poll_api.get_updates(offset));
        let polled = tokio::select! {
            _ = &mut shutdown => break,
            res = poll => res,
        };

        let updates = match polled {
            Ok(Ok(updates)) => updates,
            Ok(Err(e)) => {
                tracing::warn!(error = %format!("{e:#}"), "getUpdates failed");
                if backoff_or_shutdown(&mut shutdown).await {
                    break;
                }
                continue;
            }
            Err(e) => {
                tracing::error!(error = %e, "poll task failed");
                if backoff_or_shutdown(&mut shutdown).await {
                    break;
                }
                continue;
            }
        };

        for update in updates {
            offset = Some(update.update_id + 1);
            let Some(msg) = update.into_incoming() else {
                continue;
            };
            let bot = Arc::clone(&bot);
            tokio::task::spawn_blocking(move || {
                if let Err(e) = bot.handle(&msg) {
                    tracing::warn!(user = %msg.user_id, error = %format!("{e:#}"), "reply failed");
                }
            });
        }
    }

    tracing::info!("bot polling stopped");
    Ok(())
}

/// Wait out [`POLL_BACKOFF`]; `true` if shutdown arrived first.
async fn backoff_or_shutdown<S>(shutdown: &mut std::pin::Pin<&mut S>) -> bool
where
    S: std::future::Future<Output = ()>,
{
    tokio::select! {
        _ = shutdown.as_mut() => true,
        _ = tokio::time::sleep(POLL_BACKOFF) => false,
    }
}
