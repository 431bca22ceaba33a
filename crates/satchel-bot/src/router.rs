//! Webhook update routing: one entry point per update, session-aware
//! dispatch for text, typed dispatch for callbacks.

use std::sync::Arc;

use anyhow::Result;
use satchel_db::Database;
use satchel_types::actions::CallbackAction;
use satchel_types::telegram::{CallbackQuery, IncomingMessage, Update};
use tracing::{debug, warn};

use crate::callbacks;
use crate::commands;
use crate::conversation;
use crate::dates::DateParser;
use crate::error::{BotError, BotResult};
use crate::format;
use crate::notify::Notifier;

pub struct Engine {
    pub(crate) db: Arc<Database>,
    pub(crate) notifier: Notifier,
    pub(crate) dates: Arc<dyn DateParser>,
}

impl Engine {
    pub fn new(db: Arc<Database>, notifier: Notifier, dates: Arc<dyn DateParser>) -> Self {
        Self { db, notifier, dates }
    }

    /// Handles one decoded webhook update. An `Err` here means something
    /// unexpected (db, serialization); expected user-level failures have
    /// already been answered in the chat.
    pub async fn handle_update(&self, update: Update) -> Result<()> {
        if let Some(message) = update.message {
            return self.handle_message(message).await;
        }
        if let Some(query) = update.callback_query {
            return self.handle_callback(query).await;
        }
        debug!("Ignoring update {} with no message or callback", update.update_id);
        Ok(())
    }

    async fn handle_message(&self, message: IncomingMessage) -> Result<()> {
        let chat_id = message.chat.id;
        let Some(text) = message.text else {
            debug!("Ignoring non-text message in chat {}", chat_id);
            return Ok(());
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }

        // /cancel and /help work everywhere, even mid-conversation
        match first_word(text) {
            "/cancel" => {
                let outcome = commands::cancel(self, chat_id).await;
                return self.deliver(chat_id, outcome).await;
            }
            "/help" => {
                self.notifier.send(chat_id, format::help_text()).await;
                return Ok(());
            }
            _ => {}
        }

        // an open session consumes every other message, commands included
        let outcome = match self.db.get_session(chat_id)? {
            Some(session) => conversation::advance(self, session, text).await,
            None => commands::dispatch(self, chat_id, message.from, text).await,
        };
        self.deliver(chat_id, outcome).await
    }

    async fn handle_callback(&self, query: CallbackQuery) -> Result<()> {
        // Ack first so the client spinner stops no matter what happens below.
        self.notifier.ack(&query.id).await;

        let Some(message) = query.message else {
            debug!("Callback {} arrived without its source message", query.id);
            return Ok(());
        };
        let chat_id = message.chat.id;
        let message_id = message.message_id;

        let Some(data) = query.data else {
            return Ok(());
        };
        let Some(action) = CallbackAction::parse(&data) else {
            debug!("Unknown callback data in chat {}: {}", chat_id, data);
            return Ok(());
        };

        let outcome = match self.db.resolve_account_by_chat(chat_id)? {
            Some(account_id) => {
                callbacks::dispatch(self, &account_id, chat_id, message_id, action).await
            }
            None => Err(BotError::NotLinked),
        };
        self.deliver(chat_id, outcome).await
    }

    /// Turns handler failures into chat replies. Only `Internal` escapes
    /// to the webhook handler.
    async fn deliver(&self, chat_id: i64, outcome: BotResult<()>) -> Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(BotError::NotLinked) => {
                self.notifier.send(chat_id, format::not_linked_text()).await;
                Ok(())
            }
            Err(BotError::AssignmentNotFound(id)) => {
                debug!("Assignment {} gone from under chat {}", id, chat_id);
                self.notifier.send(chat_id, format::assignment_missing_text()).await;
                Ok(())
            }
            Err(BotError::CorruptSession(what)) => {
                warn!("Corrupt session in chat {}: missing {}", chat_id, what);
                self.db.delete_session(chat_id)?;
                self.notifier.send(chat_id, format::session_restart_text()).await;
                Ok(())
            }
            Err(BotError::Internal(e)) => Err(e),
        }
    }
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{callback_update, engine, engine_on, text_update};
    use satchel_types::models::SessionStep;

    #[tokio::test]
    async fn start_with_key_links_the_account() {
        let (engine, bot) = engine();

        engine.handle_update(text_update(9, "/start acc-123")).await.unwrap();

        assert_eq!(
            engine.db.resolve_account_by_chat(9).unwrap().as_deref(),
            Some("acc-123")
        );
        assert!(bot.last_sent_text().contains("Account Linked Successfully"));
    }

    #[tokio::test]
    async fn bare_start_sends_the_welcome() {
        let (engine, bot) = engine();

        engine.handle_update(text_update(9, "/start")).await.unwrap();

        assert!(engine.db.resolve_account_by_chat(9).unwrap().is_none());
        assert!(bot.last_sent_text().contains("Welcome to UniAssignment Bot"));
    }

    #[tokio::test]
    async fn account_commands_demand_a_link_first() {
        let (engine, bot) = engine();

        for command in ["/assignments", "/add", "/remind"] {
            engine.handle_update(text_update(9, command)).await.unwrap();
            assert!(
                bot.last_sent_text().contains("not linked yet"),
                "{command} should prompt for linking"
            );
        }
        // /help stays available without a link
        engine.handle_update(text_update(9, "/help")).await.unwrap();
        assert!(bot.last_sent_text().contains("UniAssignment Bot Help"));
    }

    #[tokio::test]
    async fn unknown_callback_data_is_acked_and_dropped() {
        let (engine, bot) = engine();
        engine.handle_update(text_update(9, "/start acc-1")).await.unwrap();
        let sends_before = bot.sent.lock().unwrap().len();

        engine
            .handle_update(callback_update(9, 50, "frobnicate_everything"))
            .await
            .unwrap();

        assert_eq!(bot.acked.lock().unwrap().len(), 1);
        assert_eq!(bot.sent.lock().unwrap().len(), sends_before);
        assert!(bot.edited.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn callbacks_answer_the_query_even_when_unlinked() {
        let (engine, bot) = engine();

        engine
            .handle_update(callback_update(9, 50, "list_all"))
            .await
            .unwrap();

        assert_eq!(bot.acked.lock().unwrap().len(), 1);
        assert!(bot.last_sent_text().contains("not linked yet"));
    }

    #[tokio::test]
    async fn help_leaves_an_open_conversation_alone() {
        let (engine, bot) = engine();
        engine.handle_update(text_update(9, "/start acc-1")).await.unwrap();
        engine.handle_update(text_update(9, "/add")).await.unwrap();

        engine.handle_update(text_update(9, "/help")).await.unwrap();

        assert!(bot.last_sent_text().contains("UniAssignment Bot Help"));
        let session = engine.db.get_session(9).unwrap().unwrap();
        assert_eq!(session.step, SessionStep::AwaitingTitle);
    }

    #[tokio::test]
    async fn an_open_session_consumes_command_looking_text() {
        let (engine, _bot) = engine();
        engine.handle_update(text_update(9, "/start acc-1")).await.unwrap();
        engine.handle_update(text_update(9, "/add")).await.unwrap();

        // "/assignments" typed mid-flow becomes the assignment title
        engine.handle_update(text_update(9, "/assignments")).await.unwrap();

        let session = engine.db.get_session(9).unwrap().unwrap();
        assert_eq!(session.step, SessionStep::AwaitingSubject);
        assert_eq!(session.draft.title.as_deref(), Some("/assignments"));
    }

    #[tokio::test]
    async fn cancel_clears_a_session_or_says_so() {
        let (engine, bot) = engine();
        engine.handle_update(text_update(9, "/start acc-1")).await.unwrap();

        engine.handle_update(text_update(9, "/cancel")).await.unwrap();
        assert!(bot.last_sent_text().contains("nothing to cancel"));

        engine.handle_update(text_update(9, "/add")).await.unwrap();
        engine.handle_update(text_update(9, "/cancel")).await.unwrap();
        assert!(bot.last_sent_text().contains("Cancelled"));
        assert!(engine.db.get_session(9).unwrap().is_none());
    }

    #[tokio::test]
    async fn non_text_and_empty_updates_are_ignored() {
        let (engine, bot) = engine();

        engine.handle_update(Update::default()).await.unwrap();

        let mut update = text_update(9, "x");
        if let Some(message) = update.message.as_mut() {
            message.text = None;
        }
        engine.handle_update(update).await.unwrap();

        assert!(bot.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn free_text_without_a_session_gets_the_fallback() {
        let (engine, bot) = engine();
        engine.handle_update(text_update(9, "/start acc-1")).await.unwrap();

        engine.handle_update(text_update(9, "hello there")).await.unwrap();
        assert!(bot.last_sent_text().contains("/help"));
    }

    #[tokio::test]
    async fn stale_view_button_reports_the_assignment_gone() {
        let db = std::sync::Arc::new(satchel_db::Database::open_in_memory().unwrap());
        let (engine, bot) = engine_on(db);
        engine.handle_update(text_update(9, "/start acc-1")).await.unwrap();

        let ghost = uuid::Uuid::new_v4();
        engine
            .handle_update(callback_update(9, 50, &format!("view_{ghost}")))
            .await
            .unwrap();

        assert!(bot.last_sent_text().contains("doesn't exist any more"));
    }
}
