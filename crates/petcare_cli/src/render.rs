use owo_colors::OwoColorize;
use petcare_core::{DashboardSnapshot, Reminder, SinkEvent, Status, Tip};

use crate::output::Output;

fn tip_line(tip: &Tip) -> String {
    format!("{} {} {}", tip.emoji, tip.title.bold(), tip.detail.dimmed())
}

fn status_line(status: &Status) -> String {
    if status.pills.is_empty() {
        return status.summary.clone();
    }
    let pills: Vec<String> = status
        .pills
        .iter()
        .map(|pill| format!("[{}]", pill.label))
        .collect();
    format!("{} {}", status.summary, pills.join(" ").bright_magenta())
}

fn reminder_line(reminder: &Reminder) -> String {
    format!(
        "{} {} ({}) {}",
        reminder.due.format("%Y-%m-%d %H:%M").to_string().bright_yellow(),
        reminder.title,
        reminder.pet_id,
        reminder.detail.dimmed()
    )
}

/// Print one dashboard update as it arrives.
pub fn event(output: &Output, event: &SinkEvent) {
    match event {
        SinkEvent::Tips(tips) => {
            output.info("tips", &format!("{} shown", tips.len()));
            if let Some(latest) = tips.last() {
                output.list_item(&tip_line(latest));
            }
        }
        SinkEvent::Status { pet_id, status } => {
            output.info("status", &format!("{pet_id}: {}", status_line(status)));
        }
        SinkEvent::Reminders(reminders) => {
            output.info("reminders", &format!("{} upcoming", reminders.len()));
        }
        SinkEvent::Loading(true) => output.status("refreshing…"),
        SinkEvent::Loading(false) => output.status("refresh done"),
        SinkEvent::Error(Some(message)) => output.error(message),
        SinkEvent::Error(None) => output.status("error cleared"),
    }
}

/// Print the whole dashboard.
pub fn snapshot(output: &Output, snapshot: &DashboardSnapshot) {
    output.section("Tips");
    if snapshot.tips.is_empty() {
        output.status("No tips yet");
    }
    for tip in &snapshot.tips {
        output.list_item(&tip_line(tip));
    }

    output.section("Health");
    for (pet_id, status) in &snapshot.statuses {
        output.kv(pet_id.as_str(), &status_line(status));
    }

    output.section("Reminders");
    if snapshot.reminders.is_empty() {
        output.status("Nothing due");
    }
    for reminder in &snapshot.reminders {
        output.list_item(&reminder_line(reminder));
    }

    if let Some(error) = &snapshot.error {
        output.print("");
        output.error(error);
    }
}
