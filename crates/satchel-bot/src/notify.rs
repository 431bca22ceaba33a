//! Outbound send layer. Delivery failures are logged and swallowed here:
//! a chat that blocked the bot must not take down a sweep or turn into an
//! error reply somewhere else.

use std::sync::Arc;

use satchel_types::telegram::InlineKeyboard;
use tracing::warn;

use crate::client::BotApi;

#[derive(Clone)]
pub struct Notifier {
    api: Arc<dyn BotApi>,
}

impl Notifier {
    pub fn new(api: Arc<dyn BotApi>) -> Self {
        Self { api }
    }

    pub async fn send(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.api.send_message(chat_id, text, None).await {
            warn!("sendMessage to chat {} failed: {}", chat_id, e);
        }
    }

    pub async fn send_with_keyboard(&self, chat_id: i64, text: &str, keyboard: &InlineKeyboard) {
        if let Err(e) = self.api.send_message(chat_id, text, Some(keyboard)).await {
            warn!("sendMessage to chat {} failed: {}", chat_id, e);
        }
    }

    pub async fn edit(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) {
        if let Err(e) = self
            .api
            .edit_message_text(chat_id, message_id, text, keyboard)
            .await
        {
            warn!("editMessageText in chat {} failed: {}", chat_id, e);
        }
    }

    pub async fn ack(&self, query_id: &str) {
        if let Err(e) = self.api.answer_callback_query(query_id).await {
            warn!("answerCallbackQuery failed: {}", e);
        }
    }
}
