//! Dashboard data model: pets, calendar events and the three generated
//! artifacts (tips, statuses, reminders).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::id::PetId;

/// Read-only snapshot of a pet, owned by the pet-management subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
}

impl Pet {
    pub fn new(id: impl Into<PetId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarEventKind {
    Medication,
    Vaccination,
    Appointment,
    Reminder,
}

impl CalendarEventKind {
    pub fn label(&self) -> &'static str {
        match self {
            CalendarEventKind::Medication => "Medication",
            CalendarEventKind::Vaccination => "Vaccination",
            CalendarEventKind::Appointment => "Vet appointment",
            CalendarEventKind::Reminder => "Care reminder",
        }
    }
}

/// A calendar entry belonging to exactly one pet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub pet_id: PetId,
    pub kind: CalendarEventKind,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub recurring: bool,
}

/// Half-open time window `[start, end)` used when loading calendar events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window spanning `lookbehind_days` before and `lookahead_days` after `now`.
    pub fn around(now: DateTime<Utc>, lookbehind_days: u32, lookahead_days: u32) -> Self {
        Self {
            start: now - Duration::days(i64::from(lookbehind_days)),
            end: now + Duration::days(i64::from(lookahead_days)),
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at < self.end
    }
}

/// A short care suggestion for one pet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tip {
    pub pet_id: PetId,
    pub emoji: String,
    pub title: String,
    pub detail: String,
}

impl Tip {
    pub fn new(
        pet_id: impl Into<PetId>,
        emoji: impl Into<String>,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            pet_id: pet_id.into(),
            emoji: emoji.into(),
            title: title.into(),
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PillColor {
    Green,
    Orange,
    Red,
    Blue,
    Purple,
    Gray,
    GreenTint,
    OrangeTint,
    RedTint,
    BlueTint,
    PurpleTint,
    GrayTint,
}

impl PillColor {
    /// Pale background counterpart of a foreground colour.
    pub fn tint(self) -> Self {
        match self {
            PillColor::Green | PillColor::GreenTint => PillColor::GreenTint,
            PillColor::Orange | PillColor::OrangeTint => PillColor::OrangeTint,
            PillColor::Red | PillColor::RedTint => PillColor::RedTint,
            PillColor::Blue | PillColor::BlueTint => PillColor::BlueTint,
            PillColor::Purple | PillColor::PurpleTint => PillColor::PurpleTint,
            PillColor::Gray | PillColor::GrayTint => PillColor::GrayTint,
        }
    }
}

/// Small labelled badge shown under a pet's status summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPill {
    pub label: String,
    pub foreground: PillColor,
    pub background: PillColor,
}

impl StatusPill {
    /// Pill with `color` text on its own tinted background.
    pub fn tinted(label: impl Into<String>, color: PillColor) -> Self {
        Self {
            label: label.into(),
            foreground: color,
            background: color.tint(),
        }
    }
}

/// Per-pet health summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub summary: String,
    pub pills: Vec<StatusPill>,
}

/// A dated care task surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub pet_id: PetId,
    pub title: String,
    pub detail: String,
    pub due: DateTime<Utc>,
    pub icon: String,
    pub tint: PillColor,
}

/// Deduplication identity of a reminder: title plus due instant in whole
/// epoch seconds. Other fields never participate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReminderKey {
    pub title: String,
    pub due_epoch_secs: i64,
}

impl Reminder {
    pub fn key(&self) -> ReminderKey {
        ReminderKey {
            title: self.title.clone(),
            due_epoch_secs: self.due.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reminder(title: &str, due: DateTime<Utc>, detail: &str) -> Reminder {
        Reminder {
            pet_id: PetId::from("max"),
            title: title.to_string(),
            detail: detail.to_string(),
            due,
            icon: "syringe".to_string(),
            tint: PillColor::Orange,
        }
    }

    #[test]
    fn test_reminder_key_ignores_subsecond_and_other_fields() {
        let due = Utc.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).unwrap();
        let a = reminder("Vaccine", due, "rabies booster");
        let b = reminder(
            "Vaccine",
            due + Duration::milliseconds(400),
            "different detail",
        );
        assert_eq!(a.key(), b.key());

        let c = reminder("Vaccine", due + Duration::seconds(1), "rabies booster");
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_date_range_is_half_open() {
        let now = Utc.with_ymd_and_hms(2026, 3, 5, 9, 0, 0).unwrap();
        let range = DateRange::around(now, 7, 30);
        assert!(range.contains(now));
        assert!(range.contains(range.start));
        assert!(!range.contains(range.end));
    }

    #[test]
    fn test_pill_tint_pairs() {
        let pill = StatusPill::tinted("2 meds", PillColor::Blue);
        assert_eq!(pill.foreground, PillColor::Blue);
        assert_eq!(pill.background, PillColor::BlueTint);
    }
}
