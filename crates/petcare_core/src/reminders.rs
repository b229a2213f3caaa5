//! Reminder deduplication.
//!
//! The dashboard's reminder list behaves as a set keyed by [`ReminderKey`]
//! and is always kept sorted by due date.

use std::collections::HashSet;

use crate::types::{Reminder, ReminderKey};

/// Merge `incoming` into `existing`, returning a new list.
///
/// The first occurrence of each key wins, so entries already in `existing`
/// take precedence over logically identical incoming ones. The result is
/// sorted ascending by due date; the sort is stable, so reminders sharing an
/// instant keep their first-seen order.
pub fn merge(existing: &[Reminder], incoming: &[Reminder]) -> Vec<Reminder> {
    let mut seen: HashSet<ReminderKey> = HashSet::with_capacity(existing.len() + incoming.len());
    let mut merged: Vec<Reminder> = existing
        .iter()
        .chain(incoming.iter())
        .filter(|reminder| seen.insert(reminder.key()))
        .cloned()
        .collect();

    merged.sort_by_key(|reminder| reminder.due);
    merged
}

/// True when `reminders` is sorted by due date and free of duplicate keys.
pub fn is_normalized(reminders: &[Reminder]) -> bool {
    let mut seen = HashSet::with_capacity(reminders.len());
    reminders.windows(2).all(|pair| pair[0].due <= pair[1].due)
        && reminders.iter().all(|reminder| seen.insert(reminder.key()))
}
