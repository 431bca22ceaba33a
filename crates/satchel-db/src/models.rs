//! Database row types, mapped one-to-one onto SQLite rows, with the
//! typed conversions into satchel-types models next to them. Timestamps
//! are RFC 3339 TEXT; `draft` and `reminder` are JSON documents.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use satchel_types::models::{
    AccountLink, Assignment, ChatSession, ExamType, Priority, Reminder, SessionDraft, SessionStep,
    Status, Subject,
};
use uuid::Uuid;

pub struct LinkRow {
    pub account_id: String,
    pub chat_id: i64,
    pub telegram_user_id: Option<i64>,
    pub linked_at: String,
}

pub struct SessionRow {
    pub chat_id: i64,
    pub account_id: String,
    pub step: String,
    pub draft: String,
    pub updated_at: String,
}

pub struct SubjectRow {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub color: String,
    pub created_at: String,
    pub last_updated: String,
}

pub struct AssignmentRow {
    pub id: String,
    pub account_id: String,
    pub title: String,
    pub subject_id: String,
    pub due_date: String,
    pub status: String,
    pub priority: String,
    pub exam_type: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub reminder: Option<String>,
}

pub(crate) fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("bad timestamp in db: {raw}"))
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid> {
    raw.parse().with_context(|| format!("bad uuid in db: {raw}"))
}

impl LinkRow {
    pub fn into_model(self) -> Result<AccountLink> {
        Ok(AccountLink {
            account_id: self.account_id,
            chat_id: self.chat_id,
            telegram_user_id: self.telegram_user_id,
            linked_at: parse_ts(&self.linked_at)?,
        })
    }
}

impl SessionRow {
    pub fn into_model(self) -> Result<ChatSession> {
        let step = SessionStep::parse(&self.step)
            .with_context(|| format!("unknown session step in db: {}", self.step))?;
        let draft: SessionDraft =
            serde_json::from_str(&self.draft).context("bad session draft json")?;
        Ok(ChatSession {
            chat_id: self.chat_id,
            account_id: self.account_id,
            step,
            draft,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

impl SubjectRow {
    pub fn into_model(self) -> Result<Subject> {
        Ok(Subject {
            id: parse_id(&self.id)?,
            account_id: self.account_id,
            name: self.name,
            color: self.color,
            created_at: parse_ts(&self.created_at)?,
            last_updated: parse_ts(&self.last_updated)?,
        })
    }
}

impl AssignmentRow {
    pub fn into_model(self) -> Result<Assignment> {
        let status = Status::parse(&self.status)
            .with_context(|| format!("unknown status in db: {}", self.status))?;
        let priority = Priority::parse(&self.priority)
            .with_context(|| format!("unknown priority in db: {}", self.priority))?;
        let exam_type = match self.exam_type.as_deref() {
            Some(raw) => Some(
                ExamType::parse(raw)
                    .with_context(|| format!("unknown exam type in db: {raw}"))?,
            ),
            None => None,
        };
        let reminder: Option<Reminder> = match self.reminder.as_deref() {
            Some(raw) => Some(serde_json::from_str(raw).context("bad reminder json")?),
            None => None,
        };
        Ok(Assignment {
            id: parse_id(&self.id)?,
            account_id: self.account_id,
            title: self.title,
            subject_id: parse_id(&self.subject_id)?,
            due_date: parse_ts(&self.due_date)?,
            status,
            priority,
            exam_type,
            description: self.description,
            created_at: parse_ts(&self.created_at)?,
            reminder,
        })
    }
}
