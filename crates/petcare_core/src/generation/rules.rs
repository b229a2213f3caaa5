//! Deterministic generator derived purely from calendar events.
//!
//! Used offline and as the status fallback for model-backed generators.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::ContentGenerator;
use crate::Result;
use crate::types::{
    CalendarEvent, CalendarEventKind, Pet, PillColor, Reminder, Status, StatusPill, Tip,
};

/// Events starting within this window are flagged as due soon.
const DUE_SOON_HOURS: i64 = 48;

#[derive(Debug, Clone, Default)]
pub struct RuleBasedGenerator {
    /// Fixed reference time; `None` uses the wall clock.
    now: Option<DateTime<Utc>>,
}

impl RuleBasedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the generator's notion of "now".
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl ContentGenerator for RuleBasedGenerator {
    async fn generate_tip(&self, pet: &Pet, events: &[CalendarEvent]) -> Result<Option<Tip>> {
        let now = self.now();
        let tip = match upcoming(events, now).first() {
            Some(event) => tip_for_event(pet, event, now),
            None => Tip::new(
                pet.id.clone(),
                "💧",
                "Fresh water, happy pet",
                format!(
                    "Nothing is scheduled for {}. A quiet week is a good time to refresh their water bowl and check their collar fit.",
                    pet.name
                ),
            ),
        };
        Ok(Some(tip))
    }

    async fn generate_status(&self, pet: &Pet, events: &[CalendarEvent]) -> Status {
        status_for(pet, events, self.now())
    }

    async fn generate_reminders(
        &self,
        pet: &Pet,
        events: &[CalendarEvent],
    ) -> Result<Vec<Reminder>> {
        let now = self.now();
        Ok(upcoming(events, now)
            .into_iter()
            .map(|event| Reminder {
                pet_id: pet.id.clone(),
                title: event.title.clone(),
                detail: format!("{} for {}", event.kind.label(), pet.name),
                due: event.starts_at,
                icon: icon_for(event.kind).to_string(),
                tint: color_for(event.kind),
            })
            .collect())
    }
}

/// Summarise a pet's upcoming calendar as a status line plus pills.
pub fn status_for(pet: &Pet, events: &[CalendarEvent], now: DateTime<Utc>) -> Status {
    let upcoming = upcoming(events, now);
    let count = |kind: CalendarEventKind| upcoming.iter().filter(|e| e.kind == kind).count();

    let mut pills = Vec::new();
    if upcoming
        .iter()
        .any(|e| e.starts_at - now <= Duration::hours(DUE_SOON_HOURS))
    {
        pills.push(StatusPill::tinted("Due soon", PillColor::Red));
    }
    match count(CalendarEventKind::Medication) {
        0 => {}
        1 => pills.push(StatusPill::tinted("1 med", PillColor::Blue)),
        n => pills.push(StatusPill::tinted(format!("{n} meds"), PillColor::Blue)),
    }
    if count(CalendarEventKind::Vaccination) > 0 {
        pills.push(StatusPill::tinted("Vaccine due", PillColor::Orange));
    }
    if count(CalendarEventKind::Appointment) > 0 {
        pills.push(StatusPill::tinted("Vet visit", PillColor::Purple));
    }

    let summary = match upcoming.len() {
        0 => {
            pills.push(StatusPill::tinted("All clear", PillColor::Green));
            format!("{} has nothing scheduled. Enjoy the quiet!", pet.name)
        }
        1 => format!("{} has 1 upcoming care item.", pet.name),
        n => format!("{} has {n} upcoming care items.", pet.name),
    };

    Status { summary, pills }
}

fn upcoming(events: &[CalendarEvent], now: DateTime<Utc>) -> Vec<&CalendarEvent> {
    let mut upcoming: Vec<&CalendarEvent> =
        events.iter().filter(|event| event.starts_at >= now).collect();
    upcoming.sort_by_key(|event| event.starts_at);
    upcoming
}

fn tip_for_event(pet: &Pet, event: &CalendarEvent, now: DateTime<Utc>) -> Tip {
    let when = describe_when(now, event.starts_at);
    let (emoji, title, detail) = match event.kind {
        CalendarEventKind::Medication => (
            "💊",
            "Stay on schedule",
            format!(
                "{}'s {} is {when}. Pairing it with a favourite treat keeps the routine easy.",
                pet.name, event.title
            ),
        ),
        CalendarEventKind::Vaccination => (
            "💉",
            "Vaccine prep",
            format!(
                "{} is due for {} {when}. Bring their vaccination record and plan a calm afternoon after.",
                pet.name, event.title
            ),
        ),
        CalendarEventKind::Appointment => (
            "🩺",
            "Vet visit ahead",
            format!(
                "{} has {} {when}. Note any changes in appetite or energy to share with the vet.",
                pet.name, event.title
            ),
        ),
        CalendarEventKind::Reminder => (
            "🐾",
            "Care check-in",
            format!("{} is {when} for {}.", event.title, pet.name),
        ),
    };
    Tip::new(pet.id.clone(), emoji, title, detail)
}

fn describe_when(now: DateTime<Utc>, at: DateTime<Utc>) -> String {
    match (at.date_naive() - now.date_naive()).num_days() {
        i64::MIN..=0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        n => format!("in {n} days"),
    }
}

fn icon_for(kind: CalendarEventKind) -> &'static str {
    match kind {
        CalendarEventKind::Medication => "pills",
        CalendarEventKind::Vaccination => "syringe",
        CalendarEventKind::Appointment => "stethoscope",
        CalendarEventKind::Reminder => "bell",
    }
}

fn color_for(kind: CalendarEventKind) -> PillColor {
    match kind {
        CalendarEventKind::Medication => PillColor::Blue,
        CalendarEventKind::Vaccination => PillColor::Orange,
        CalendarEventKind::Appointment => PillColor::Purple,
        CalendarEventKind::Reminder => PillColor::Green,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap()
    }

    fn event(kind: CalendarEventKind, title: &str, offset: Duration) -> CalendarEvent {
        CalendarEvent {
            pet_id: "max".into(),
            kind,
            title: title.to_string(),
            starts_at: now() + offset,
            recurring: false,
        }
    }

    fn max() -> Pet {
        Pet::new("max", "Max")
    }

    #[tokio::test]
    async fn test_tip_targets_earliest_upcoming_event() {
        let events = vec![
            event(CalendarEventKind::Appointment, "Annual checkup", Duration::days(6)),
            event(CalendarEventKind::Medication, "Heartworm pill", Duration::days(1)),
            event(CalendarEventKind::Vaccination, "Rabies booster", -Duration::days(3)),
        ];

        let tip = RuleBasedGenerator::at(now())
            .generate_tip(&max(), &events)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(tip.pet_id, max().id);
        assert_eq!(tip.emoji, "💊");
        assert!(tip.detail.contains("tomorrow"));
    }

    #[tokio::test]
    async fn test_tip_without_events_is_general_advice() {
        let tip = RuleBasedGenerator::at(now())
            .generate_tip(&max(), &[])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tip.emoji, "💧");
    }

    #[test]
    fn test_status_pills_reflect_upcoming_events() {
        let events = vec![
            event(CalendarEventKind::Medication, "Heartworm pill", Duration::hours(3)),
            event(CalendarEventKind::Medication, "Joint supplement", Duration::days(4)),
            event(CalendarEventKind::Vaccination, "Rabies booster", Duration::days(10)),
        ];

        let status = status_for(&max(), &events, now());

        let labels: Vec<_> = status.pills.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Due soon", "2 meds", "Vaccine due"]);
        assert_eq!(status.summary, "Max has 3 upcoming care items.");
    }

    #[test]
    fn test_status_with_only_past_events_is_all_clear() {
        let events = vec![event(
            CalendarEventKind::Appointment,
            "Dental cleaning",
            -Duration::days(2),
        )];

        let status = status_for(&max(), &events, now());

        assert_eq!(status.pills, vec![StatusPill::tinted("All clear", PillColor::Green)]);
    }

    #[tokio::test]
    async fn test_reminders_come_from_upcoming_events_in_order() {
        let events = vec![
            event(CalendarEventKind::Appointment, "Annual checkup", Duration::days(6)),
            event(CalendarEventKind::Vaccination, "Rabies booster", Duration::days(2)),
            event(CalendarEventKind::Medication, "Old pill", -Duration::days(1)),
        ];

        let reminders = RuleBasedGenerator::at(now())
            .generate_reminders(&max(), &events)
            .await
            .unwrap();

        let titles: Vec<_> = reminders.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Rabies booster", "Annual checkup"]);
        assert_eq!(reminders[0].icon, "syringe");
        assert_eq!(reminders[0].detail, "Vaccination for Max");
    }
}
