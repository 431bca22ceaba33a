use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Subject color assigned when the bot auto-creates a subject the web app
/// has never seen. Matches the web frontend's default swatch class.
pub const DEFAULT_SUBJECT_COLOR: &str = "bg-blue-500";

// -- Account linking --

/// One `chat -> account` binding, created by `/start <key>`. The link key
/// IS the account id: the web app renders `t.me/<bot>?start=<account_id>`
/// and Telegram delivers the key back as the /start payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountLink {
    pub account_id: String,
    pub chat_id: i64,
    pub telegram_user_id: Option<i64>,
    pub linked_at: DateTime<Utc>,
}

// -- Subjects and assignments --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: Uuid,
    pub account_id: String,
    pub name: String,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// Assignment lifecycle status. The serialized strings are the display
/// strings the web app stores, so the two sides stay interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(Self::Pending),
            "In Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Pending => "⏳",
            Self::InProgress => "🔄",
            Self::Completed => "✅",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Low" => Some(Self::Low),
            "Medium" => Some(Self::Medium),
            "High" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Midterm,
    Final,
}

impl ExamType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Midterm => "midterm",
            Self::Final => "final",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "midterm" => Some(Self::Midterm),
            "final" => Some(Self::Final),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: Uuid,
    pub account_id: String,
    pub title: String,
    pub subject_id: Uuid,
    pub due_date: DateTime<Utc>,
    pub status: Status,
    pub priority: Priority,
    pub exam_type: Option<ExamType>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub reminder: Option<Reminder>,
}

// -- Reminders --

/// Reminder timing choices offered in the bot's preset menu. `Custom` is
/// only ever accompanied by `custom_minutes` or `custom_time` on the
/// [`Reminder`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderPreset {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "3d")]
    ThreeDays,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "custom")]
    Custom,
}

impl ReminderPreset {
    /// The five fixed presets, in menu order.
    pub const NAMED: [ReminderPreset; 5] = [
        Self::OneHour,
        Self::SixHours,
        Self::OneDay,
        Self::ThreeDays,
        Self::OneWeek,
    ];

    /// Offset before the due date. `None` for `Custom`, whose offset lives
    /// on the reminder, not the preset.
    pub fn minutes_before_due(self) -> Option<i64> {
        match self {
            Self::OneHour => Some(60),
            Self::SixHours => Some(360),
            Self::OneDay => Some(1440),
            Self::ThreeDays => Some(4320),
            Self::OneWeek => Some(10080),
            Self::Custom => None,
        }
    }

    /// Short code used in callback payloads and stored JSON ("1h", "1w", ...).
    pub fn code(self) -> &'static str {
        match self {
            Self::OneHour => "1h",
            Self::SixHours => "6h",
            Self::OneDay => "1d",
            Self::ThreeDays => "3d",
            Self::OneWeek => "1w",
            Self::Custom => "custom",
        }
    }

    /// Parses a short code into one of the five fixed presets. "custom" is
    /// rejected here: custom reminders are configured through conversation,
    /// never through a bare preset code.
    pub fn parse_named(code: &str) -> Option<Self> {
        match code {
            "1h" => Some(Self::OneHour),
            "6h" => Some(Self::SixHours),
            "1d" => Some(Self::OneDay),
            "3d" => Some(Self::ThreeDays),
            "1w" => Some(Self::OneWeek),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::OneHour => "1 hour before",
            Self::SixHours => "6 hours before",
            Self::OneDay => "1 day before",
            Self::ThreeDays => "3 days before",
            Self::OneWeek => "1 week before",
            Self::Custom => "Custom",
        }
    }
}

/// Reminder settings attached to an assignment. Serialized field names
/// mirror the documents the web app stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub enabled: bool,
    pub preset: ReminderPreset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_minutes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
}

impl Reminder {
    /// Enabled reminder on one of the fixed presets. `sent_at` starts clear,
    /// so re-selecting a preset re-arms an already-fired reminder.
    pub fn named(preset: ReminderPreset) -> Self {
        Self {
            enabled: true,
            preset,
            custom_minutes: None,
            custom_time: None,
            sent_at: None,
        }
    }

    /// Enabled custom reminder, `minutes` before the due date.
    pub fn custom(minutes: i64) -> Self {
        Self {
            enabled: true,
            preset: ReminderPreset::Custom,
            custom_minutes: Some(minutes),
            custom_time: None,
            sent_at: None,
        }
    }

    /// The instant this reminder should fire, given the assignment's due
    /// date. For `Custom`, an absolute `custom_time` wins over
    /// `custom_minutes`; a custom reminder with neither has no trigger and
    /// never fires.
    pub fn trigger_time(&self, due: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if let Some(minutes) = self.preset.minutes_before_due() {
            return Some(due - Duration::minutes(minutes));
        }
        if let Some(at) = self.custom_time {
            return Some(at);
        }
        self.custom_minutes.map(|m| due - Duration::minutes(m))
    }

    /// True when this reminder should fire inside `[start, end]`. Disabled
    /// and already-sent reminders are never due.
    pub fn is_due_within(
        &self,
        due: DateTime<Utc>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> bool {
        if !self.enabled || self.sent_at.is_some() {
            return false;
        }
        match self.trigger_time(due) {
            Some(at) => at >= start && at <= end,
            None => false,
        }
    }
}

// -- Conversation sessions --

/// Where a multi-step conversation currently stands. One row per chat;
/// stored as plain text in the sessions table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    AwaitingTitle,
    AwaitingSubject,
    AwaitingDueDate,
    AwaitingEditValue,
    AwaitingReminderPreset,
}

impl SessionStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingTitle => "awaiting_title",
            Self::AwaitingSubject => "awaiting_subject",
            Self::AwaitingDueDate => "awaiting_due_date",
            Self::AwaitingEditValue => "awaiting_edit_value",
            Self::AwaitingReminderPreset => "awaiting_reminder_preset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "awaiting_title" => Some(Self::AwaitingTitle),
            "awaiting_subject" => Some(Self::AwaitingSubject),
            "awaiting_due_date" => Some(Self::AwaitingDueDate),
            "awaiting_edit_value" => Some(Self::AwaitingEditValue),
            "awaiting_reminder_preset" => Some(Self::AwaitingReminderPreset),
            _ => None,
        }
    }
}

/// Which assignment field an edit conversation is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditField {
    Title,
    DueDate,
}

/// Partial data accumulated across conversation steps, stored as one JSON
/// document on the session row. Which fields are populated depends on the
/// flow: the add flow fills `title` then `subject_id`; edit and reminder
/// flows carry the target assignment instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editing_assignment_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_field: Option<EditField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_assignment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub chat_id: i64,
    pub account_id: String,
    pub step: SessionStep,
    pub draft: SessionDraft,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn preset_offsets() {
        assert_eq!(ReminderPreset::OneHour.minutes_before_due(), Some(60));
        assert_eq!(ReminderPreset::SixHours.minutes_before_due(), Some(360));
        assert_eq!(ReminderPreset::OneDay.minutes_before_due(), Some(1440));
        assert_eq!(ReminderPreset::ThreeDays.minutes_before_due(), Some(4320));
        assert_eq!(ReminderPreset::OneWeek.minutes_before_due(), Some(10080));
        assert_eq!(ReminderPreset::Custom.minutes_before_due(), None);
    }

    #[test]
    fn named_trigger_is_offset_before_due() {
        for preset in ReminderPreset::NAMED {
            let r = Reminder::named(preset);
            let minutes = preset.minutes_before_due().unwrap();
            assert_eq!(
                r.trigger_time(due()),
                Some(due() - Duration::minutes(minutes)),
                "wrong trigger for {:?}",
                preset
            );
        }
    }

    #[test]
    fn custom_minutes_trigger() {
        let r = Reminder::custom(90);
        assert_eq!(r.trigger_time(due()), Some(due() - Duration::minutes(90)));
    }

    #[test]
    fn custom_time_wins_over_custom_minutes() {
        let at = Utc.with_ymd_and_hms(2026, 5, 30, 8, 0, 0).unwrap();
        let r = Reminder {
            enabled: true,
            preset: ReminderPreset::Custom,
            custom_minutes: Some(90),
            custom_time: Some(at),
            sent_at: None,
        };
        assert_eq!(r.trigger_time(due()), Some(at));
    }

    #[test]
    fn custom_without_basis_never_triggers() {
        let r = Reminder {
            enabled: true,
            preset: ReminderPreset::Custom,
            custom_minutes: None,
            custom_time: None,
            sent_at: None,
        };
        assert_eq!(r.trigger_time(due()), None);
        assert!(!r.is_due_within(due(), due() - Duration::days(30), due()));
    }

    #[test]
    fn due_within_window_bounds() {
        // 1h preset fires at due - 60min
        let r = Reminder::named(ReminderPreset::OneHour);
        let trigger = due() - Duration::minutes(60);

        assert!(r.is_due_within(due(), trigger - Duration::minutes(5), trigger + Duration::minutes(5)));
        // window edges are inclusive
        assert!(r.is_due_within(due(), trigger, trigger));
        // entirely before / after the trigger
        assert!(!r.is_due_within(due(), trigger + Duration::minutes(1), trigger + Duration::minutes(10)));
        assert!(!r.is_due_within(due(), trigger - Duration::minutes(10), trigger - Duration::minutes(1)));
    }

    #[test]
    fn sent_or_disabled_reminders_are_never_due() {
        let trigger = due() - Duration::minutes(60);
        let window = (trigger - Duration::minutes(5), trigger + Duration::minutes(5));

        let mut r = Reminder::named(ReminderPreset::OneHour);
        r.sent_at = Some(trigger);
        assert!(!r.is_due_within(due(), window.0, window.1));

        let mut r = Reminder::named(ReminderPreset::OneHour);
        r.enabled = false;
        assert!(!r.is_due_within(due(), window.0, window.1));
    }

    #[test]
    fn reminder_json_uses_web_app_field_names() {
        let mut r = Reminder::named(ReminderPreset::OneDay);
        r.sent_at = Some(due());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["enabled"], serde_json::json!(true));
        assert_eq!(json["preset"], serde_json::json!("1d"));
        assert!(json["sentAt"].as_str().unwrap().starts_with("2026-06-01T12:00:00"));
        assert!(json.get("customMinutes").is_none());

        let back: Reminder = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn status_strings_match_web_app() {
        assert_eq!(Status::InProgress.as_str(), "In Progress");
        assert_eq!(Status::parse("In Progress"), Some(Status::InProgress));
        assert_eq!(Status::parse("in progress"), None);
        assert_eq!(
            serde_json::to_value(Status::InProgress).unwrap(),
            serde_json::json!("In Progress")
        );
    }

    #[test]
    fn empty_draft_serializes_empty() {
        let draft = SessionDraft::default();
        assert_eq!(serde_json::to_value(&draft).unwrap(), serde_json::json!({}));

        // unknown future fields are tolerated
        let parsed: SessionDraft =
            serde_json::from_str(r#"{"title":"Essay","somethingNew":1}"#).unwrap();
        assert_eq!(parsed.title.as_deref(), Some("Essay"));
    }
}
