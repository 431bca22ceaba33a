//! Minimal slice of the Telegram Bot API wire format: just the inbound
//! update fields the bot reads and the inline-keyboard shape it sends.
//! Everything else Telegram includes is ignored on deserialize.

use serde::{Deserialize, Serialize};

use crate::actions::CallbackAction;

/// One webhook delivery. At most one of `message` / `callback_query` is
/// set; updates carrying neither are acknowledged and dropped.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Update {
    #[serde(default)]
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<TelegramUser>,
    /// Absent for stickers, photos and other non-text content.
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
}

/// An inline-button press, relayed with the message the button lives on.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: TelegramUser,
    pub message: Option<IncomingMessage>,
    pub data: Option<String>,
}

/// Inline keyboard: ordered rows of buttons. Serializes straight into the
/// Bot API's `reply_markup` parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.inline_keyboard.push(buttons);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, action: &CallbackAction) -> Self {
        Self {
            text: text.into(),
            callback_data: action.encode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn deserializes_a_real_text_update() {
        let raw = r#"{
            "update_id": 523,
            "message": {
                "message_id": 77,
                "from": {"id": 9001, "is_bot": false, "first_name": "Ada"},
                "chat": {"id": 9001, "type": "private"},
                "date": 1767225600,
                "text": "/start abc-123"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let msg = update.message.unwrap();
        assert_eq!(msg.chat.id, 9001);
        assert_eq!(msg.from.unwrap().id, 9001);
        assert_eq!(msg.text.as_deref(), Some("/start abc-123"));
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn deserializes_a_callback_update() {
        let raw = r#"{
            "update_id": 524,
            "callback_query": {
                "id": "4382abc",
                "from": {"id": 9001, "is_bot": false, "first_name": "Ada"},
                "message": {"message_id": 42, "chat": {"id": 9001, "type": "private"}, "date": 0},
                "chat_instance": "-53",
                "data": "list_all"
            }
        }"#;
        let update: Update = serde_json::from_str(raw).unwrap();
        let query = update.callback_query.unwrap();
        assert_eq!(query.data.as_deref(), Some("list_all"));
        assert_eq!(query.message.unwrap().chat.id, 9001);
    }

    #[test]
    fn keyboard_serializes_to_rows_of_buttons() {
        let id = Uuid::nil();
        let kb = InlineKeyboard::new().row(vec![
            InlineButton::new("View", &CallbackAction::View(id)),
            InlineButton::new("Delete", &CallbackAction::DeleteConfirm(id)),
        ]);
        let json = serde_json::to_value(&kb).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inline_keyboard": [[
                    {"text": "View", "callback_data": format!("view_{id}")},
                    {"text": "Delete", "callback_data": format!("delete_confirm_{id}")}
                ]]
            })
        );
    }
}
