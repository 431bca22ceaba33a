//! Shared fixtures for engine tests: a recording bot, a canned date
//! parser, and update builders shaped like real webhook payloads.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use satchel_db::Database;
use satchel_types::telegram::{
    CallbackQuery, Chat, IncomingMessage, InlineKeyboard, TelegramUser, Update,
};

use crate::client::BotApi;
use crate::dates::DateParser;
use crate::notify::Notifier;
use crate::router::Engine;

pub(crate) struct MockBot {
    pub sent: Mutex<Vec<(i64, String, Option<InlineKeyboard>)>>,
    pub edited: Mutex<Vec<(i64, i64, String, Option<InlineKeyboard>)>>,
    pub acked: Mutex<Vec<String>>,
}

impl MockBot {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            edited: Mutex::new(Vec::new()),
            acked: Mutex::new(Vec::new()),
        })
    }

    pub fn last_sent_text(&self) -> String {
        self.sent
            .lock()
            .unwrap()
            .last()
            .map(|(_, text, _)| text.clone())
            .unwrap_or_default()
    }

    pub fn last_edit(&self) -> (i64, i64, String, Option<InlineKeyboard>) {
        self.edited
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no message was edited")
    }
}

#[async_trait]
impl BotApi for MockBot {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboard>,
    ) -> Result<i64> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((chat_id, text.to_string(), reply_markup.cloned()));
        Ok(1000 + sent.len() as i64)
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        reply_markup: Option<&InlineKeyboard>,
    ) -> Result<()> {
        self.edited
            .lock()
            .unwrap()
            .push((chat_id, message_id, text.to_string(), reply_markup.cloned()));
        Ok(())
    }

    async fn answer_callback_query(&self, query_id: &str) -> Result<()> {
        self.acked.lock().unwrap().push(query_id.to_string());
        Ok(())
    }
}

/// Parser that answers every input with the same canned instant.
pub(crate) struct FixedDate(pub Option<DateTime<Utc>>);

impl DateParser for FixedDate {
    fn parse(&self, _text: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.0
    }
}

/// Far enough out that "is this in the future?" checks against the real
/// clock stay true for a long time.
pub(crate) fn fixed_due() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2035, 6, 1, 18, 0, 0).unwrap()
}

pub(crate) fn engine() -> (Engine, Arc<MockBot>) {
    engine_with_parser(Arc::new(FixedDate(Some(fixed_due()))))
}

pub(crate) fn engine_on(db: Arc<Database>) -> (Engine, Arc<MockBot>) {
    let bot = MockBot::new();
    let engine = Engine::new(db, Notifier::new(bot.clone()), Arc::new(FixedDate(Some(fixed_due()))));
    (engine, bot)
}

pub(crate) fn engine_with_parser(parser: Arc<dyn DateParser>) -> (Engine, Arc<MockBot>) {
    let bot = MockBot::new();
    let db = Arc::new(Database::open_in_memory().expect("in-memory db"));
    let engine = Engine::new(db, Notifier::new(bot.clone()), parser);
    (engine, bot)
}

pub(crate) fn text_update(chat_id: i64, text: &str) -> Update {
    Update {
        update_id: 1,
        message: Some(IncomingMessage {
            message_id: 1,
            chat: Chat { id: chat_id },
            from: Some(TelegramUser { id: chat_id }),
            text: Some(text.to_string()),
        }),
        callback_query: None,
    }
}

pub(crate) fn callback_update(chat_id: i64, message_id: i64, data: &str) -> Update {
    Update {
        update_id: 2,
        message: None,
        callback_query: Some(CallbackQuery {
            id: format!("query-{message_id}"),
            from: TelegramUser { id: chat_id },
            message: Some(IncomingMessage {
                message_id,
                chat: Chat { id: chat_id },
                from: None,
                text: None,
            }),
            data: Some(data.to_string()),
        }),
    }
}
