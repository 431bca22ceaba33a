use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS account_links (
            account_id          TEXT PRIMARY KEY,
            chat_id             INTEGER NOT NULL,
            telegram_user_id    INTEGER,
            linked_at           TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_links_chat
            ON account_links(chat_id, linked_at);

        CREATE TABLE IF NOT EXISTS chat_sessions (
            chat_id     INTEGER PRIMARY KEY,
            account_id  TEXT NOT NULL,
            step        TEXT NOT NULL,
            draft       TEXT NOT NULL DEFAULT '{}',
            updated_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS subjects (
            id            TEXT PRIMARY KEY,
            account_id    TEXT NOT NULL,
            name          TEXT NOT NULL,
            color         TEXT NOT NULL,
            created_at    TEXT NOT NULL,
            last_updated  TEXT NOT NULL,
            UNIQUE(account_id, name)
        );

        CREATE TABLE IF NOT EXISTS assignments (
            id          TEXT PRIMARY KEY,
            account_id  TEXT NOT NULL,
            title       TEXT NOT NULL,
            subject_id  TEXT NOT NULL REFERENCES subjects(id),
            due_date    TEXT NOT NULL,
            status      TEXT NOT NULL,
            priority    TEXT NOT NULL,
            exam_type   TEXT,
            description TEXT,
            created_at  TEXT NOT NULL,
            reminder    TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_assignments_account_due
            ON assignments(account_id, due_date);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
