//! Telegram Bot API client: a thin reqwest wrapper over the three methods
//! the bot actually calls. The [`BotApi`] trait is the seam tests use to
//! swap in a recording fake.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use satchel_types::telegram::InlineKeyboard;

#[async_trait]
pub trait BotApi: Send + Sync {
    /// Sends an HTML-formatted message, returning the new message id.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboard>,
    ) -> Result<i64>;

    /// Rewrites an already-sent message in place.
    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboard>,
    ) -> Result<()>;

    /// Acknowledges a callback query so the client stops its spinner.
    async fn answer_callback_query(&self, query_id: &str) -> Result<()>;
}

pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: format!("https://api.telegram.org/bot{bot_token}"),
        }
    }

    /// Points the client at a different API host.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.base_url, method);
        let resp = self.client.post(&url).json(&body).send().await?;
        let status = resp.status();
        let body: serde_json::Value = resp.json().await?;

        // Telegram reports failures in-band: {"ok": false, "description": ...}
        if !body["ok"].as_bool().unwrap_or(false) {
            let desc = body["description"].as_str().unwrap_or("unknown error");
            return Err(anyhow!("Telegram API error ({status}): {desc}"));
        }
        Ok(body)
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboard>,
    ) -> Result<i64> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }
        let resp = self.call("sendMessage", body).await?;
        Ok(resp["result"]["message_id"].as_i64().unwrap_or(0))
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboard>,
    ) -> Result<()> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
            "parse_mode": "HTML",
        });
        if let Some(markup) = reply_markup {
            body["reply_markup"] = serde_json::to_value(markup)?;
        }
        self.call("editMessageText", body).await?;
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str) -> Result<()> {
        self.call(
            "answerCallbackQuery",
            serde_json::json!({ "callback_query_id": query_id }),
        )
        .await?;
        Ok(())
    }
}
