use crate::Database;
use crate::models::{AssignmentRow, LinkRow, SessionRow, SubjectRow};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension;
use satchel_types::models::{AccountLink, Assignment, ChatSession, Reminder, Status, Subject};
use uuid::Uuid;

const ASSIGNMENT_COLS: &str =
    "id, account_id, title, subject_id, due_date, status, priority, exam_type, description, created_at, reminder";

impl Database {
    // -- Account links --

    /// Inserts or refreshes the binding for a link key. Re-linking the same
    /// account from a new chat moves the binding; the old chat goes silent.
    pub fn link_account(
        &self,
        account_id: &str,
        chat_id: i64,
        telegram_user_id: Option<i64>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO account_links (account_id, chat_id, telegram_user_id, linked_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(account_id) DO UPDATE SET
                    chat_id = excluded.chat_id,
                    telegram_user_id = excluded.telegram_user_id,
                    linked_at = excluded.linked_at",
                rusqlite::params![
                    account_id,
                    chat_id,
                    telegram_user_id,
                    Utc::now().to_rfc3339()
                ],
            )?;
            Ok(())
        })
    }

    /// The account bound to a chat. When several keys were started from the
    /// same chat, the most recently linked one wins.
    pub fn resolve_account_by_chat(&self, chat_id: i64) -> Result<Option<String>> {
        self.with_conn(|conn| {
            let account = conn
                .query_row(
                    "SELECT account_id FROM account_links
                     WHERE chat_id = ?1
                     ORDER BY linked_at DESC
                     LIMIT 1",
                    [chat_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(account)
        })
    }

    pub fn list_links(&self) -> Result<Vec<AccountLink>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT account_id, chat_id, telegram_user_id, linked_at
                 FROM account_links ORDER BY linked_at",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(LinkRow {
                        account_id: row.get(0)?,
                        chat_id: row.get(1)?,
                        telegram_user_id: row.get(2)?,
                        linked_at: row.get(3)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(LinkRow::into_model).collect()
        })
    }

    // -- Chat sessions --

    /// Writes the whole session for its chat, replacing any previous one.
    /// Starting a new flow therefore abandons whatever was in progress.
    pub fn upsert_session(&self, session: &ChatSession) -> Result<()> {
        let draft = serde_json::to_string(&session.draft)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO chat_sessions (chat_id, account_id, step, draft, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    session.chat_id,
                    session.account_id,
                    session.step.as_str(),
                    draft,
                    session.updated_at.to_rfc3339()
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_session(&self, chat_id: i64) -> Result<Option<ChatSession>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT chat_id, account_id, step, draft, updated_at
                     FROM chat_sessions WHERE chat_id = ?1",
                    [chat_id],
                    |row| {
                        Ok(SessionRow {
                            chat_id: row.get(0)?,
                            account_id: row.get(1)?,
                            step: row.get(2)?,
                            draft: row.get(3)?,
                            updated_at: row.get(4)?,
                        })
                    },
                )
                .optional()?;
            row.map(SessionRow::into_model).transpose()
        })
    }

    pub fn delete_session(&self, chat_id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM chat_sessions WHERE chat_id = ?1", [chat_id])?;
            Ok(())
        })
    }

    // -- Subjects --

    pub fn insert_subject(&self, subject: &Subject) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO subjects (id, account_id, name, color, created_at, last_updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    subject.id.to_string(),
                    subject.account_id,
                    subject.name,
                    subject.color,
                    subject.created_at.to_rfc3339(),
                    subject.last_updated.to_rfc3339()
                ],
            )?;
            Ok(())
        })
    }

    /// Exact, case-sensitive name match within the account. "History" and
    /// "history" are different subjects, same as in the web app.
    pub fn find_subject_by_name(&self, account_id: &str, name: &str) -> Result<Option<Subject>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, account_id, name, color, created_at, last_updated
                     FROM subjects WHERE account_id = ?1 AND name = ?2",
                    rusqlite::params![account_id, name],
                    subject_row,
                )
                .optional()?;
            row.map(SubjectRow::into_model).transpose()
        })
    }

    pub fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, account_id, name, color, created_at, last_updated
                     FROM subjects WHERE id = ?1",
                    [id.to_string()],
                    subject_row,
                )
                .optional()?;
            row.map(SubjectRow::into_model).transpose()
        })
    }

    pub fn list_subject_names(&self, account_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name FROM subjects WHERE account_id = ?1 ORDER BY name",
            )?;
            let names = stmt
                .query_map([account_id], |row| row.get(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(names)
        })
    }

    // -- Assignments --

    pub fn insert_assignment(&self, a: &Assignment) -> Result<()> {
        let reminder = a.reminder.as_ref().map(serde_json::to_string).transpose()?;
        self.with_conn(|conn| {
            conn.execute(
                &format!("INSERT INTO assignments ({ASSIGNMENT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"),
                rusqlite::params![
                    a.id.to_string(),
                    a.account_id,
                    a.title,
                    a.subject_id.to_string(),
                    a.due_date.to_rfc3339(),
                    a.status.as_str(),
                    a.priority.as_str(),
                    a.exam_type.map(|e| e.as_str()),
                    a.description,
                    a.created_at.to_rfc3339(),
                    reminder
                ],
            )?;
            Ok(())
        })
    }

    /// Fetch scoped to the owning account, so a forged callback id can
    /// never reach another account's assignment.
    pub fn get_account_assignment(
        &self,
        account_id: &str,
        id: Uuid,
    ) -> Result<Option<Assignment>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    &format!("SELECT {ASSIGNMENT_COLS} FROM assignments WHERE account_id = ?1 AND id = ?2"),
                    rusqlite::params![account_id, id.to_string()],
                    assignment_row,
                )
                .optional()?;
            row.map(AssignmentRow::into_model).transpose()
        })
    }

    /// All of an account's assignments, soonest due first.
    pub fn list_assignments_by_due(&self, account_id: &str, limit: u32) -> Result<Vec<Assignment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ASSIGNMENT_COLS} FROM assignments
                 WHERE account_id = ?1
                 ORDER BY due_date
                 LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![account_id, limit], assignment_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(AssignmentRow::into_model).collect()
        })
    }

    /// Like [`Database::list_assignments_by_due`] but without completed work.
    pub fn list_open_assignments(&self, account_id: &str, limit: u32) -> Result<Vec<Assignment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ASSIGNMENT_COLS} FROM assignments
                 WHERE account_id = ?1 AND status != 'Completed'
                 ORDER BY due_date
                 LIMIT ?2"
            ))?;
            let rows = stmt
                .query_map(rusqlite::params![account_id, limit], assignment_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(AssignmentRow::into_model).collect()
        })
    }

    /// Assignments the reminder sweep has to look at: not completed and
    /// carrying reminder settings. Window math happens in the sweeper.
    pub fn list_reminder_candidates(&self, account_id: &str) -> Result<Vec<Assignment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ASSIGNMENT_COLS} FROM assignments
                 WHERE account_id = ?1 AND status != 'Completed' AND reminder IS NOT NULL
                 ORDER BY due_date"
            ))?;
            let rows = stmt
                .query_map([account_id], assignment_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(AssignmentRow::into_model).collect()
        })
    }

    pub fn update_assignment_title(&self, id: Uuid, title: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE assignments SET title = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), title],
            )?;
            Ok(())
        })
    }

    pub fn update_assignment_due(&self, id: Uuid, due: DateTime<Utc>) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE assignments SET due_date = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), due.to_rfc3339()],
            )?;
            Ok(())
        })
    }

    pub fn update_assignment_status(&self, id: Uuid, status: Status) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE assignments SET status = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), status.as_str()],
            )?;
            Ok(())
        })
    }

    /// Replaces the whole reminder document; `None` clears it.
    pub fn update_assignment_reminder(&self, id: Uuid, reminder: Option<&Reminder>) -> Result<()> {
        let json = reminder.map(serde_json::to_string).transpose()?;
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE assignments SET reminder = ?2 WHERE id = ?1",
                rusqlite::params![id.to_string(), json],
            )?;
            Ok(())
        })
    }

    pub fn delete_assignment(&self, id: Uuid) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM assignments WHERE id = ?1",
                [id.to_string()],
            )?;
            Ok(())
        })
    }
}

fn subject_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubjectRow> {
    Ok(SubjectRow {
        id: row.get(0)?,
        account_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        created_at: row.get(4)?,
        last_updated: row.get(5)?,
    })
}

fn assignment_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AssignmentRow> {
    Ok(AssignmentRow {
        id: row.get(0)?,
        account_id: row.get(1)?,
        title: row.get(2)?,
        subject_id: row.get(3)?,
        due_date: row.get(4)?,
        status: row.get(5)?,
        priority: row.get(6)?,
        exam_type: row.get(7)?,
        description: row.get(8)?,
        created_at: row.get(9)?,
        reminder: row.get(10)?,
    })
}
