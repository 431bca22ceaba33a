//! Inline-button handlers. All of these rewrite the message the button
//! lives on, so the chat reads as one card changing state instead of a
//! trail of stale menus. Prompts that need typed input start a session
//! and send a fresh message instead.

use chrono::Utc;
use satchel_types::actions::CallbackAction;
use satchel_types::models::{
    Assignment, ChatSession, EditField, Reminder, ReminderPreset, SessionDraft, SessionStep,
    Status,
};
use tracing::info;
use uuid::Uuid;

use crate::commands::LIST_LIMIT;
use crate::error::{BotError, BotResult};
use crate::format;
use crate::router::Engine;

pub(crate) async fn dispatch(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    action: CallbackAction,
) -> BotResult<()> {
    match action {
        CallbackAction::View(id) => show_detail(engine, account_id, chat_id, message_id, id).await,
        CallbackAction::ToggleStatus(id) => {
            toggle_status(engine, account_id, chat_id, message_id, id).await
        }
        CallbackAction::DeleteConfirm(id) => {
            confirm_delete(engine, account_id, chat_id, message_id, id).await
        }
        CallbackAction::DeleteFinal(id) => {
            delete_assignment(engine, account_id, chat_id, message_id, id).await
        }
        CallbackAction::EditMenu(id) => {
            edit_menu(engine, account_id, chat_id, message_id, id).await
        }
        CallbackAction::EditField { field, id } => {
            start_edit(engine, account_id, chat_id, field, id).await
        }
        CallbackAction::ReminderMenu(id) => {
            reminder_menu(engine, account_id, chat_id, message_id, id).await
        }
        CallbackAction::SetPreset { preset, id } => {
            set_preset(engine, account_id, chat_id, message_id, preset, id).await
        }
        CallbackAction::DisableReminder(id) => {
            disable_reminder(engine, account_id, chat_id, message_id, id).await
        }
        CallbackAction::CustomReminder(id) => {
            start_custom_reminder(engine, account_id, chat_id, id).await
        }
        CallbackAction::ListAll => list_all(engine, account_id, chat_id, message_id).await,
    }
}

/// Every handler starts here: ids come from button payloads, which can
/// outlive the assignment they point at.
fn fetch(engine: &Engine, account_id: &str, id: Uuid) -> BotResult<Assignment> {
    engine
        .db
        .get_account_assignment(account_id, id)?
        .ok_or(BotError::AssignmentNotFound(id))
}

async fn show_detail(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    id: Uuid,
) -> BotResult<()> {
    let a = fetch(engine, account_id, id)?;
    let subject_name = engine
        .db
        .get_subject(a.subject_id)?
        .map(|s| s.name)
        .unwrap_or_else(|| "(no subject)".to_string());
    engine
        .notifier
        .edit(
            chat_id,
            message_id,
            &format::detail_text(&a, &subject_name, Utc::now()),
            Some(&format::detail_keyboard(&a)),
        )
        .await;
    Ok(())
}

async fn toggle_status(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    id: Uuid,
) -> BotResult<()> {
    let a = fetch(engine, account_id, id)?;
    let next = if a.status == Status::Completed {
        Status::Pending
    } else {
        Status::Completed
    };
    engine.db.update_assignment_status(id, next)?;
    show_detail(engine, account_id, chat_id, message_id, id).await
}

async fn confirm_delete(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    id: Uuid,
) -> BotResult<()> {
    let a = fetch(engine, account_id, id)?;
    engine
        .notifier
        .edit(
            chat_id,
            message_id,
            &format::delete_confirm_text(&a),
            Some(&format::delete_confirm_keyboard(&a)),
        )
        .await;
    Ok(())
}

async fn delete_assignment(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    id: Uuid,
) -> BotResult<()> {
    let a = fetch(engine, account_id, id)?;
    engine.db.delete_assignment(id)?;
    info!("Deleted assignment {} for account {}", id, account_id);
    engine
        .notifier
        .edit(
            chat_id,
            message_id,
            &format::deleted_text(&a.title),
            Some(&format::back_to_list_keyboard()),
        )
        .await;
    Ok(())
}

async fn edit_menu(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    id: Uuid,
) -> BotResult<()> {
    let a = fetch(engine, account_id, id)?;
    engine
        .notifier
        .edit(
            chat_id,
            message_id,
            &format::edit_menu_text(&a),
            Some(&format::edit_menu_keyboard(&a)),
        )
        .await;
    Ok(())
}

/// Plants an edit session and prompts for the new value in a fresh
/// message; the reply comes back as plain text through the conversation.
async fn start_edit(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    field: EditField,
    id: Uuid,
) -> BotResult<()> {
    fetch(engine, account_id, id)?;
    let session = ChatSession {
        chat_id,
        account_id: account_id.to_string(),
        step: SessionStep::AwaitingEditValue,
        draft: SessionDraft {
            editing_assignment_id: Some(id),
            edit_field: Some(field),
            ..SessionDraft::default()
        },
        updated_at: Utc::now(),
    };
    engine.db.upsert_session(&session)?;
    engine
        .notifier
        .send(chat_id, format::edit_value_prompt(field))
        .await;
    Ok(())
}

async fn reminder_menu(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    id: Uuid,
) -> BotResult<()> {
    let a = fetch(engine, account_id, id)?;
    engine
        .notifier
        .edit(
            chat_id,
            message_id,
            &format::reminder_menu_text(&a, Utc::now()),
            Some(&format::reminder_menu_keyboard(&a)),
        )
        .await;
    Ok(())
}

/// Overwrites the reminder with a fresh preset document. `sent_at` starts
/// clear, so picking a preset re-arms a reminder that already fired.
async fn set_preset(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    preset: ReminderPreset,
    id: Uuid,
) -> BotResult<()> {
    fetch(engine, account_id, id)?;
    engine
        .db
        .update_assignment_reminder(id, Some(&Reminder::named(preset)))?;
    show_detail(engine, account_id, chat_id, message_id, id).await
}

/// Keeps the reminder's settings but switches it off. A disable tap on an
/// assignment without a reminder is a no-op redraw.
async fn disable_reminder(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
    id: Uuid,
) -> BotResult<()> {
    let a = fetch(engine, account_id, id)?;
    if let Some(mut reminder) = a.reminder {
        reminder.enabled = false;
        engine.db.update_assignment_reminder(id, Some(&reminder))?;
    }
    show_detail(engine, account_id, chat_id, message_id, id).await
}

async fn start_custom_reminder(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    id: Uuid,
) -> BotResult<()> {
    fetch(engine, account_id, id)?;
    let session = ChatSession {
        chat_id,
        account_id: account_id.to_string(),
        step: SessionStep::AwaitingReminderPreset,
        draft: SessionDraft {
            reminder_assignment_id: Some(id),
            ..SessionDraft::default()
        },
        updated_at: Utc::now(),
    };
    engine.db.upsert_session(&session)?;
    engine
        .notifier
        .send(chat_id, format::custom_reminder_prompt())
        .await;
    Ok(())
}

/// Replaces the card with the list view. Also drops any open session:
/// tapping back to the list reads as leaving whatever was in progress.
async fn list_all(
    engine: &Engine,
    account_id: &str,
    chat_id: i64,
    message_id: i64,
) -> BotResult<()> {
    engine.db.delete_session(chat_id)?;
    let list = engine.db.list_assignments_by_due(account_id, LIST_LIMIT)?;

    if list.is_empty() {
        engine
            .notifier
            .edit(chat_id, message_id, format::empty_list_text(), None)
            .await;
    } else {
        engine
            .notifier
            .edit(
                chat_id,
                message_id,
                &format::list_text(&list),
                Some(&format::list_keyboard(&list)),
            )
            .await;
    }
    Ok(())
}
