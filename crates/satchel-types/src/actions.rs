use uuid::Uuid;

use crate::models::{EditField, ReminderPreset};

/// A decoded inline-button press. The wire form is an opaque code string
/// (`view_<id>`, `remind_preset_1d_<id>`, ...) capped by Telegram at 64
/// bytes; decoding happens once at the router boundary so handlers only
/// ever see typed payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    /// Show an assignment's detail card.
    View(Uuid),
    /// Flip between Completed and a working status.
    ToggleStatus(Uuid),
    /// First tap of the two-step delete.
    DeleteConfirm(Uuid),
    /// Second, destructive tap.
    DeleteFinal(Uuid),
    /// Show the field picker for editing.
    EditMenu(Uuid),
    /// Start collecting a new value for one field.
    EditField { field: EditField, id: Uuid },
    /// Show the reminder preset menu.
    ReminderMenu(Uuid),
    /// Arm a reminder on a fixed preset.
    SetPreset { preset: ReminderPreset, id: Uuid },
    /// Disable the assignment's reminder.
    DisableReminder(Uuid),
    /// Start the free-form custom reminder conversation.
    CustomReminder(Uuid),
    /// Return to the assignment list.
    ListAll,
}

impl CallbackAction {
    /// Decodes a callback payload. Returns `None` for anything outside the
    /// vocabulary, including stale codes from older bot versions and
    /// `remind_preset_custom_*` (custom reminders go through conversation,
    /// not a preset code).
    pub fn parse(code: &str) -> Option<Self> {
        if code == "list_all" {
            return Some(Self::ListAll);
        }
        if let Some(rest) = code.strip_prefix("view_") {
            return Some(Self::View(rest.parse().ok()?));
        }
        if let Some(rest) = code.strip_prefix("toggle_") {
            return Some(Self::ToggleStatus(rest.parse().ok()?));
        }
        if let Some(rest) = code.strip_prefix("delete_confirm_") {
            return Some(Self::DeleteConfirm(rest.parse().ok()?));
        }
        if let Some(rest) = code.strip_prefix("delete_final_") {
            return Some(Self::DeleteFinal(rest.parse().ok()?));
        }
        if let Some(rest) = code.strip_prefix("edit_menu_") {
            return Some(Self::EditMenu(rest.parse().ok()?));
        }
        if let Some(rest) = code.strip_prefix("edit_field_title_") {
            return Some(Self::EditField {
                field: EditField::Title,
                id: rest.parse().ok()?,
            });
        }
        if let Some(rest) = code.strip_prefix("edit_field_date_") {
            return Some(Self::EditField {
                field: EditField::DueDate,
                id: rest.parse().ok()?,
            });
        }
        if let Some(rest) = code.strip_prefix("remind_set_") {
            return Some(Self::ReminderMenu(rest.parse().ok()?));
        }
        if let Some(rest) = code.strip_prefix("remind_preset_") {
            let (preset, id) = rest.split_once('_')?;
            return Some(Self::SetPreset {
                preset: ReminderPreset::parse_named(preset)?,
                id: id.parse().ok()?,
            });
        }
        if let Some(rest) = code.strip_prefix("remind_disable_") {
            return Some(Self::DisableReminder(rest.parse().ok()?));
        }
        if let Some(rest) = code.strip_prefix("remind_custom_") {
            return Some(Self::CustomReminder(rest.parse().ok()?));
        }
        None
    }

    /// Encodes back to the wire code. `parse(encode(a)) == Some(a)` for
    /// every action.
    pub fn encode(&self) -> String {
        match self {
            Self::View(id) => format!("view_{id}"),
            Self::ToggleStatus(id) => format!("toggle_{id}"),
            Self::DeleteConfirm(id) => format!("delete_confirm_{id}"),
            Self::DeleteFinal(id) => format!("delete_final_{id}"),
            Self::EditMenu(id) => format!("edit_menu_{id}"),
            Self::EditField { field: EditField::Title, id } => format!("edit_field_title_{id}"),
            Self::EditField { field: EditField::DueDate, id } => format!("edit_field_date_{id}"),
            Self::ReminderMenu(id) => format!("remind_set_{id}"),
            Self::SetPreset { preset, id } => format!("remind_preset_{}_{id}", preset.code()),
            Self::DisableReminder(id) => format!("remind_disable_{id}"),
            Self::CustomReminder(id) => format!("remind_custom_{id}"),
            Self::ListAll => "list_all".to_string(),
        }
    }
}
