//! Slash-command handlers. Only reached when the chat has no open
//! conversation; the router short-circuits /cancel and /help earlier.

use chrono::Utc;
use satchel_types::models::{ChatSession, SessionDraft, SessionStep};
use satchel_types::telegram::TelegramUser;
use tracing::info;

use crate::error::{BotError, BotResult};
use crate::format;
use crate::router::Engine;

/// How many assignments a list message shows, same cap as the original bot.
pub(crate) const LIST_LIMIT: u32 = 10;

pub(crate) async fn dispatch(
    engine: &Engine,
    chat_id: i64,
    from: Option<TelegramUser>,
    text: &str,
) -> BotResult<()> {
    let mut words = text.split_whitespace();
    let command = words.next().unwrap_or("");

    match command {
        "/start" => start(engine, chat_id, from, words.next()).await,
        "/assignments" => assignments(engine, chat_id).await,
        "/add" => add(engine, chat_id).await,
        "/remind" => remind(engine, chat_id).await,
        _ => {
            engine.notifier.send(chat_id, format::fallback_text()).await;
            Ok(())
        }
    }
}

/// Resolves the account behind a chat, or asks the user to link one.
pub(crate) fn require_link(engine: &Engine, chat_id: i64) -> BotResult<String> {
    engine
        .db
        .resolve_account_by_chat(chat_id)?
        .ok_or(BotError::NotLinked)
}

/// `/start <key>` binds the chat to the account named by the key; a bare
/// `/start` just greets. The key arrives via Telegram's deep-link payload,
/// minted by the web app's Settings page.
async fn start(
    engine: &Engine,
    chat_id: i64,
    from: Option<TelegramUser>,
    key: Option<&str>,
) -> BotResult<()> {
    match key {
        Some(key) if !key.is_empty() => {
            engine
                .db
                .link_account(key, chat_id, from.map(|user| user.id))?;
            info!("Linked account {} to chat {}", key, chat_id);
            engine.notifier.send(chat_id, format::linked_text()).await;
        }
        _ => {
            engine.notifier.send(chat_id, format::welcome_text()).await;
        }
    }
    Ok(())
}

async fn assignments(engine: &Engine, chat_id: i64) -> BotResult<()> {
    let account_id = require_link(engine, chat_id)?;
    let list = engine.db.list_assignments_by_due(&account_id, LIST_LIMIT)?;

    if list.is_empty() {
        engine.notifier.send(chat_id, format::empty_list_text()).await;
    } else {
        engine
            .notifier
            .send_with_keyboard(chat_id, &format::list_text(&list), &format::list_keyboard(&list))
            .await;
    }
    Ok(())
}

/// `/add` opens the three-step creation conversation. Any previous
/// session in this chat is replaced outright.
async fn add(engine: &Engine, chat_id: i64) -> BotResult<()> {
    let account_id = require_link(engine, chat_id)?;
    let session = ChatSession {
        chat_id,
        account_id,
        step: SessionStep::AwaitingTitle,
        draft: SessionDraft::default(),
        updated_at: Utc::now(),
    };
    engine.db.upsert_session(&session)?;
    engine.notifier.send(chat_id, format::title_prompt()).await;
    Ok(())
}

async fn remind(engine: &Engine, chat_id: i64) -> BotResult<()> {
    let account_id = require_link(engine, chat_id)?;
    let list = engine.db.list_open_assignments(&account_id, LIST_LIMIT)?;

    if list.is_empty() {
        engine
            .notifier
            .send(chat_id, format::no_open_assignments_text())
            .await;
    } else {
        engine
            .notifier
            .send_with_keyboard(chat_id, format::remind_pick_text(), &format::remind_pick_keyboard(&list))
            .await;
    }
    Ok(())
}

pub(crate) async fn cancel(engine: &Engine, chat_id: i64) -> BotResult<()> {
    if engine.db.get_session(chat_id)?.is_some() {
        engine.db.delete_session(chat_id)?;
        engine.notifier.send(chat_id, format::cancelled_text()).await;
    } else {
        engine
            .notifier
            .send(chat_id, format::nothing_to_cancel_text())
            .await;
    }
    Ok(())
}
