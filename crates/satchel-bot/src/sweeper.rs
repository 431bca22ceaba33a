//! Periodic reminder sweep.
//!
//! Runs on an interval, computes the window around the tick, and pushes a
//! notification for every armed reminder whose trigger falls inside it.
//! Fired reminders get `sent_at` stamped afterwards; the read-check-write
//! is not atomic, so two sweeps racing over the same row could both send.
//! With one sweep task per process that stays theoretical.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use satchel_db::Database;
use tracing::{info, warn};

use crate::format;
use crate::notify::Notifier;

pub async fn run_sweep_loop(db: Arc<Database>, notifier: Notifier, interval_secs: u64) {
    let mut interval = tokio::time::interval(StdDuration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        match sweep_once(&db, &notifier, Utc::now(), interval_secs).await {
            Ok(count) => {
                if count > 0 {
                    info!("Reminder sweep: dispatched {} notifications", count);
                }
            }
            Err(e) => {
                warn!("Reminder sweep error: {}", e);
            }
        }
    }
}

/// One pass over every linked account. The window is centered on `now`
/// and spans one interval, so triggers land in exactly one tick whether
/// they fall just before or just after it.
pub async fn sweep_once(
    db: &Database,
    notifier: &Notifier,
    now: DateTime<Utc>,
    interval_secs: u64,
) -> Result<usize> {
    let half = Duration::seconds((interval_secs / 2) as i64);
    let window_start = now - half;
    let window_end = now + half;

    let mut dispatched = 0;
    for link in db.list_links()? {
        let candidates = db.list_reminder_candidates(&link.account_id)?;
        for assignment in candidates {
            let Some(reminder) = assignment.reminder.as_ref() else {
                continue;
            };
            if !reminder.is_due_within(assignment.due_date, window_start, window_end) {
                continue;
            }

            notifier
                .send(link.chat_id, &format::reminder_notification(&assignment, now))
                .await;

            let mut sent = reminder.clone();
            sent.sent_at = Some(now);
            db.update_assignment_reminder(assignment.id, Some(&sent))?;
            dispatched += 1;
        }
    }
    Ok(dispatched)
}
