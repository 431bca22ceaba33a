//! Every message text and inline keyboard the bot produces. Copy keeps
//! the voice of the web app's original bot: HTML bolding, emoji tags,
//! short lines.

use chrono::{DateTime, Utc};
use satchel_types::actions::CallbackAction;
use satchel_types::models::{Assignment, EditField, Reminder, ReminderPreset, Status};
use satchel_types::telegram::{InlineButton, InlineKeyboard};

// -- Shared helpers --

/// User-supplied text goes out with parse_mode=HTML, so the three HTML
/// metacharacters must be escaped or a title like "a < b" kills the send.
pub(crate) fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn due_display(due: DateTime<Utc>) -> String {
    due.format("%d %b %Y, %H:%M").to_string()
}

fn due_short(due: DateTime<Utc>) -> String {
    due.format("%d %b").to_string()
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

/// Humanizes a minute offset the way the web app does: minutes under an
/// hour, hours under a day, days beyond that.
pub(crate) fn time_before_due(minutes: i64) -> String {
    if minutes < 60 {
        plural(minutes, "minute")
    } else if minutes < 1440 {
        plural(((minutes as f64) / 60.0).round() as i64, "hour")
    } else {
        plural(((minutes as f64) / 1440.0).round() as i64, "day")
    }
}

// -- Fixed texts --

pub(crate) fn welcome_text() -> &'static str {
    "👋 <b>Welcome to UniAssignment Bot!</b>\n\n\
     To link your account, please use the link from your web app Settings page.\n\n\
     Commands:\n\
     /assignments - View your assignments\n\
     /add - Add a new assignment\n\
     /remind - Set a reminder\n\
     /help - Get help"
}

pub(crate) fn linked_text() -> &'static str {
    "✅ <b>Account Linked Successfully!</b>\n\n\
     You will now receive notifications for your upcoming assignments.\n\n\
     Use /assignments to view your current tasks."
}

pub(crate) fn not_linked_text() -> &'static str {
    "❌ Your account is not linked yet.\n\n\
     Please link your account from the web app Settings page first."
}

pub(crate) fn help_text() -> &'static str {
    "📖 <b>UniAssignment Bot Help</b>\n\n\
     This bot helps you track your university assignments.\n\n\
     <b>Commands:</b>\n\
     /assignments - View your upcoming assignments\n\
     /add - Add a new assignment\n\
     /remind - Set a reminder for an assignment\n\
     /cancel - Cancel the current operation\n\
     /help - Show this help message\n\n\
     Link your account from the web app to get started!"
}

pub(crate) fn fallback_text() -> &'static str {
    "🤷 I didn't catch that. Try /help."
}

pub(crate) fn cancelled_text() -> &'static str {
    "❌ Cancelled. Nothing was saved."
}

pub(crate) fn nothing_to_cancel_text() -> &'static str {
    "There's nothing to cancel right now."
}

pub(crate) fn empty_list_text() -> &'static str {
    "📚 You have no assignments yet!"
}

pub(crate) fn no_open_assignments_text() -> &'static str {
    "📚 No pending assignments to remind you about!"
}

pub(crate) fn assignment_missing_text() -> &'static str {
    "❌ That assignment doesn't exist any more."
}

pub(crate) fn session_restart_text() -> &'static str {
    "😵 I lost track of that conversation. Please start again."
}

// -- Add / edit / reminder conversation prompts --

pub(crate) fn title_prompt() -> &'static str {
    "📝 <b>New Assignment</b>\n\nWhat's the title?"
}

pub(crate) fn subject_prompt(names: &[String]) -> String {
    let mut text = String::from("📖 Which subject is this for?");
    if !names.is_empty() {
        text.push_str("\n\nYour subjects:");
        for name in names {
            text.push_str("\n• ");
            text.push_str(&escape_html(name));
        }
    }
    text
}

pub(crate) fn due_prompt() -> &'static str {
    "📅 When is it due?\n\n\
     You can say \"tomorrow\", \"tomorrow 18:00\", \"in 3 days\" or \"2026-06-01 18:00\"."
}

pub(crate) fn bad_date_text() -> &'static str {
    "🤔 I couldn't read that date.\n\n\
     Try \"tomorrow 18:00\", \"in 3 days\" or \"2026-06-01\"."
}

pub(crate) fn created_text(a: &Assignment) -> String {
    format!(
        "✅ <b>{}</b> added!\n📅 Due: {}",
        escape_html(&a.title),
        due_display(a.due_date)
    )
}

pub(crate) fn edit_value_prompt(field: EditField) -> &'static str {
    match field {
        EditField::Title => "📝 Send me the new title.",
        EditField::DueDate => {
            "📅 Send me the new due date.\n\n\
             You can say \"tomorrow\", \"in 3 days\" or \"2026-06-01 18:00\"."
        }
    }
}

pub(crate) fn title_updated_text(title: &str) -> String {
    format!("✏️ Title updated to <b>{}</b>.", escape_html(title))
}

pub(crate) fn date_updated_text(due: DateTime<Utc>) -> String {
    format!("✏️ Due date updated to {}.", due_display(due))
}

pub(crate) fn custom_reminder_prompt() -> &'static str {
    "🔧 When should I remind you?\n\n\
     Try \"3 days\", \"2 hours\", \"1 week\", or an exact time like \"2026-06-01 18:00\"."
}

pub(crate) fn bad_reminder_text() -> &'static str {
    "🤔 I couldn't read that.\n\n\
     Try \"3 days\", \"2 hours\", or a future time like \"2026-06-01 18:00\"."
}

pub(crate) fn custom_reminder_set_text(minutes: i64) -> String {
    format!("🔔 Reminder set: {} before due.", time_before_due(minutes))
}

// -- Assignment list --

pub(crate) fn list_text(assignments: &[Assignment]) -> String {
    let mut message = String::from("📚 <b>Your Assignments:</b>\n\n");
    for (index, a) in assignments.iter().enumerate() {
        message.push_str(&format!(
            "{}. {} <b>{}</b>\n   📅 Due: {}\n\n",
            index + 1,
            a.status.emoji(),
            escape_html(&a.title),
            due_display(a.due_date)
        ));
    }
    message.push_str("Tap an assignment to manage it.");
    message
}

pub(crate) fn list_keyboard(assignments: &[Assignment]) -> InlineKeyboard {
    let mut kb = InlineKeyboard::new();
    for (index, a) in assignments.iter().enumerate() {
        kb = kb.row(vec![InlineButton::new(
            format!("{}. {} {}", index + 1, a.status.emoji(), a.title),
            &CallbackAction::View(a.id),
        )]);
    }
    kb
}

pub(crate) fn remind_pick_text() -> &'static str {
    "🔔 <b>Reminders</b>\n\nPick an assignment:"
}

pub(crate) fn remind_pick_keyboard(assignments: &[Assignment]) -> InlineKeyboard {
    let mut kb = InlineKeyboard::new();
    for a in assignments {
        let bell = match &a.reminder {
            Some(r) if r.enabled => "🔔",
            _ => "🔕",
        };
        kb = kb.row(vec![InlineButton::new(
            format!("{bell} {} · {}", a.title, due_short(a.due_date)),
            &CallbackAction::ReminderMenu(a.id),
        )]);
    }
    kb
}

// -- Assignment detail card --

pub(crate) fn detail_text(a: &Assignment, subject_name: &str, now: DateTime<Utc>) -> String {
    let mut text = format!(
        "{} <b>{}</b>\n\n📖 {}\n📅 Due: {}\n📊 Status: {}\n🎯 Priority: {}",
        a.status.emoji(),
        escape_html(&a.title),
        escape_html(subject_name),
        due_display(a.due_date),
        a.status.as_str(),
        a.priority.as_str(),
    );
    if let Some(exam) = a.exam_type {
        text.push_str(&format!("\n📝 Exam: {}", exam.as_str()));
    }
    text.push_str(&format!(
        "\n🔔 Reminder: {}",
        reminder_summary(a.reminder.as_ref(), a.due_date, now)
    ));
    if let Some(desc) = a.description.as_deref().filter(|d| !d.is_empty()) {
        text.push_str(&format!("\n\n<i>{}</i>", escape_html(desc)));
    }
    text
}

pub(crate) fn detail_keyboard(a: &Assignment) -> InlineKeyboard {
    let toggle_label = if a.status == Status::Completed {
        "↩️ Mark as pending"
    } else {
        "✅ Mark as done"
    };
    InlineKeyboard::new()
        .row(vec![
            InlineButton::new(toggle_label, &CallbackAction::ToggleStatus(a.id)),
            InlineButton::new("✏️ Edit", &CallbackAction::EditMenu(a.id)),
        ])
        .row(vec![
            InlineButton::new("🔔 Reminder", &CallbackAction::ReminderMenu(a.id)),
            InlineButton::new("🗑 Delete", &CallbackAction::DeleteConfirm(a.id)),
        ])
        .row(vec![InlineButton::new(
            "« All assignments",
            &CallbackAction::ListAll,
        )])
}

/// One line describing the reminder state, with a warning when the
/// configured trigger already lies in the past and hasn't fired.
pub(crate) fn reminder_summary(
    reminder: Option<&Reminder>,
    due: DateTime<Utc>,
    now: DateTime<Utc>,
) -> String {
    let Some(r) = reminder else {
        return "none".to_string();
    };
    if !r.enabled {
        return "off".to_string();
    }

    // named presets carry their own label; for Custom an absolute time
    // wins over a minute offset, same as the trigger math
    let mut text = if r.preset.minutes_before_due().is_some() {
        format!("{} due", r.preset.label())
    } else if let Some(at) = r.custom_time {
        format!("On {}", due_display(at))
    } else if let Some(minutes) = r.custom_minutes {
        format!("{} before due", time_before_due(minutes))
    } else {
        return "not set".to_string();
    };

    if r.sent_at.is_some() {
        text.push_str(" · ✅ sent");
    } else if r.trigger_time(due).is_some_and(|at| at < now) {
        text.push_str(" · ⚠️ past due");
    }
    text
}

// -- Delete flow --

pub(crate) fn delete_confirm_text(a: &Assignment) -> String {
    format!(
        "⚠️ Delete <b>{}</b>?\n\nThis cannot be undone.",
        escape_html(&a.title)
    )
}

pub(crate) fn delete_confirm_keyboard(a: &Assignment) -> InlineKeyboard {
    InlineKeyboard::new()
        .row(vec![InlineButton::new(
            "🗑 Yes, delete it",
            &CallbackAction::DeleteFinal(a.id),
        )])
        .row(vec![InlineButton::new("« Back", &CallbackAction::View(a.id))])
}

pub(crate) fn deleted_text(title: &str) -> String {
    format!("🗑 <b>{}</b> deleted.", escape_html(title))
}

pub(crate) fn back_to_list_keyboard() -> InlineKeyboard {
    InlineKeyboard::new().row(vec![InlineButton::new(
        "« All assignments",
        &CallbackAction::ListAll,
    )])
}

// -- Edit flow --

pub(crate) fn edit_menu_text(a: &Assignment) -> String {
    format!(
        "✏️ <b>Edit {}</b>\n\nWhat do you want to change?",
        escape_html(&a.title)
    )
}

pub(crate) fn edit_menu_keyboard(a: &Assignment) -> InlineKeyboard {
    InlineKeyboard::new()
        .row(vec![
            InlineButton::new(
                "📝 Title",
                &CallbackAction::EditField { field: EditField::Title, id: a.id },
            ),
            InlineButton::new(
                "📅 Due date",
                &CallbackAction::EditField { field: EditField::DueDate, id: a.id },
            ),
        ])
        .row(vec![InlineButton::new("« Back", &CallbackAction::View(a.id))])
}

// -- Reminder menu --

pub(crate) fn reminder_menu_text(a: &Assignment, now: DateTime<Utc>) -> String {
    format!(
        "🔔 <b>Reminder for {}</b>\n\n📅 Due: {}\nCurrent: {}\n\nWhen should I remind you?",
        escape_html(&a.title),
        due_display(a.due_date),
        reminder_summary(a.reminder.as_ref(), a.due_date, now)
    )
}

pub(crate) fn reminder_menu_keyboard(a: &Assignment) -> InlineKeyboard {
    let preset_button = |preset: ReminderPreset| {
        InlineButton::new(
            preset.label(),
            &CallbackAction::SetPreset { preset, id: a.id },
        )
    };

    let mut kb = InlineKeyboard::new()
        .row(vec![
            preset_button(ReminderPreset::OneHour),
            preset_button(ReminderPreset::SixHours),
        ])
        .row(vec![
            preset_button(ReminderPreset::OneDay),
            preset_button(ReminderPreset::ThreeDays),
        ])
        .row(vec![
            preset_button(ReminderPreset::OneWeek),
            InlineButton::new("🔧 Custom…", &CallbackAction::CustomReminder(a.id)),
        ]);
    if a.reminder.as_ref().is_some_and(|r| r.enabled) {
        kb = kb.row(vec![InlineButton::new(
            "🔕 Disable reminder",
            &CallbackAction::DisableReminder(a.id),
        )]);
    }
    kb.row(vec![InlineButton::new("« Back", &CallbackAction::View(a.id))])
}

// -- Sweep notification --

pub(crate) fn reminder_notification(a: &Assignment, now: DateTime<Utc>) -> String {
    let minutes_left = (a.due_date - now).num_minutes();
    let lead = if minutes_left > 0 {
        format!("{} left", time_before_due(minutes_left))
    } else {
        "Past due".to_string()
    };
    format!(
        "🔔 <b>Assignment Reminder</b>\n\n📌 <b>{}</b>\n📅 Due: {}\n⏰ {}",
        escape_html(&a.title),
        due_display(a.due_date),
        lead
    )
}
