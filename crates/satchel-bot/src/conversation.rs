//! Multi-step conversation handling. Each step reads one text message,
//! mutates the persisted session, and either re-prompts or finishes the
//! flow. State lives entirely in the sessions table, so a restart between
//! messages loses nothing.

use chrono::Utc;
use satchel_types::models::{
    Assignment, ChatSession, EditField, Priority, Reminder, SessionStep, Status, Subject,
    DEFAULT_SUBJECT_COLOR,
};
use tracing::info;
use uuid::Uuid;

use crate::dates;
use crate::error::{BotError, BotResult};
use crate::format;
use crate::router::Engine;

pub(crate) async fn advance(engine: &Engine, session: ChatSession, text: &str) -> BotResult<()> {
    match session.step {
        SessionStep::AwaitingTitle => collect_title(engine, session, text).await,
        SessionStep::AwaitingSubject => collect_subject(engine, session, text).await,
        SessionStep::AwaitingDueDate => collect_due_date(engine, session, text).await,
        SessionStep::AwaitingEditValue => collect_edit_value(engine, session, text).await,
        SessionStep::AwaitingReminderPreset => collect_reminder(engine, session, text).await,
    }
}

async fn collect_title(engine: &Engine, mut session: ChatSession, text: &str) -> BotResult<()> {
    session.draft.title = Some(text.to_string());
    session.step = SessionStep::AwaitingSubject;
    session.updated_at = Utc::now();
    engine.db.upsert_session(&session)?;

    let names = engine.db.list_subject_names(&session.account_id)?;
    engine
        .notifier
        .send(session.chat_id, &format::subject_prompt(&names))
        .await;
    Ok(())
}

/// Matches the typed name against the account's subjects, case-sensitive;
/// an unknown name becomes a new subject with the default color.
async fn collect_subject(engine: &Engine, mut session: ChatSession, text: &str) -> BotResult<()> {
    let name = text.trim();
    let subject = match engine.db.find_subject_by_name(&session.account_id, name)? {
        Some(existing) => existing,
        None => {
            let now = Utc::now();
            let subject = Subject {
                id: Uuid::new_v4(),
                account_id: session.account_id.clone(),
                name: name.to_string(),
                color: DEFAULT_SUBJECT_COLOR.to_string(),
                created_at: now,
                last_updated: now,
            };
            engine.db.insert_subject(&subject)?;
            info!("Created subject {:?} for account {}", name, session.account_id);
            subject
        }
    };

    session.draft.subject_id = Some(subject.id);
    session.step = SessionStep::AwaitingDueDate;
    session.updated_at = Utc::now();
    engine.db.upsert_session(&session)?;
    engine.notifier.send(session.chat_id, format::due_prompt()).await;
    Ok(())
}

async fn collect_due_date(engine: &Engine, session: ChatSession, text: &str) -> BotResult<()> {
    let now = Utc::now();
    let Some(due) = engine.dates.parse(text, now) else {
        // unreadable input re-prompts; the session stays where it is
        engine.notifier.send(session.chat_id, format::bad_date_text()).await;
        return Ok(());
    };

    let title = session
        .draft
        .title
        .clone()
        .ok_or(BotError::CorruptSession("a title"))?;
    let subject_id = session
        .draft
        .subject_id
        .ok_or(BotError::CorruptSession("a subject"))?;

    let assignment = Assignment {
        id: Uuid::new_v4(),
        account_id: session.account_id.clone(),
        title,
        subject_id,
        due_date: due,
        status: Status::Pending,
        priority: Priority::Medium,
        exam_type: None,
        description: Some("Added via chat".to_string()),
        created_at: now,
        reminder: None,
    };
    engine.db.insert_assignment(&assignment)?;
    engine.db.delete_session(session.chat_id)?;
    info!(
        "Created assignment {} for account {}",
        assignment.id, assignment.account_id
    );
    engine
        .notifier
        .send(session.chat_id, &format::created_text(&assignment))
        .await;
    Ok(())
}

async fn collect_edit_value(engine: &Engine, session: ChatSession, text: &str) -> BotResult<()> {
    let id = session
        .draft
        .editing_assignment_id
        .ok_or(BotError::CorruptSession("an assignment id"))?;
    let field = session
        .draft
        .edit_field
        .ok_or(BotError::CorruptSession("an edit field"))?;

    // the target can vanish mid-conversation (deleted from the web app)
    if engine
        .db
        .get_account_assignment(&session.account_id, id)?
        .is_none()
    {
        engine.db.delete_session(session.chat_id)?;
        return Err(BotError::AssignmentNotFound(id));
    }

    match field {
        EditField::Title => {
            engine.db.update_assignment_title(id, text)?;
            engine.db.delete_session(session.chat_id)?;
            engine
                .notifier
                .send(session.chat_id, &format::title_updated_text(text))
                .await;
        }
        EditField::DueDate => {
            let Some(due) = engine.dates.parse(text, Utc::now()) else {
                engine.notifier.send(session.chat_id, format::bad_date_text()).await;
                return Ok(());
            };
            engine.db.update_assignment_due(id, due)?;
            engine.db.delete_session(session.chat_id)?;
            engine
                .notifier
                .send(session.chat_id, &format::date_updated_text(due))
                .await;
        }
    }
    Ok(())
}

/// Custom reminder input: a relative offset like "3 days" wins; failing
/// that, a parseable future instant becomes its distance before the due
/// date. Anything that lands on a non-positive offset re-prompts.
async fn collect_reminder(engine: &Engine, session: ChatSession, text: &str) -> BotResult<()> {
    let id = session
        .draft
        .reminder_assignment_id
        .ok_or(BotError::CorruptSession("an assignment id"))?;
    let Some(assignment) = engine.db.get_account_assignment(&session.account_id, id)? else {
        engine.db.delete_session(session.chat_id)?;
        return Err(BotError::AssignmentNotFound(id));
    };

    let now = Utc::now();
    let minutes = dates::parse_relative_minutes(text).or_else(|| {
        engine
            .dates
            .parse(text, now)
            .filter(|at| *at > now)
            .map(|at| (assignment.due_date - at).num_minutes())
    });

    match minutes {
        Some(minutes) if minutes > 0 => {
            engine
                .db
                .update_assignment_reminder(id, Some(&Reminder::custom(minutes)))?;
            engine.db.delete_session(session.chat_id)?;
            engine
                .notifier
                .send(session.chat_id, &format::custom_reminder_set_text(minutes))
                .await;
        }
        _ => {
            engine.notifier.send(session.chat_id, format::bad_reminder_text()).await;
        }
    }
    Ok(())
}
