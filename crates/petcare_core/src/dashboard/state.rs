use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::PetId;
use crate::types::{Reminder, Status, Tip};

/// Dashboard state owned by the aggregation engine.
///
/// Only the engine mutates it; everyone else sees [`DashboardSnapshot`]s.
#[derive(Debug, Default)]
pub(crate) struct DashboardState {
    pub(crate) tips: Vec<Tip>,
    pub(crate) statuses: BTreeMap<PetId, Status>,
    pub(crate) reminders: Vec<Reminder>,
    pub(crate) loading: bool,
    /// Sinks were last told `loading = true` and have not seen it cleared.
    pub(crate) loading_published: bool,
    pub(crate) error: Option<String>,
    pub(crate) has_completed_once: bool,
}

impl DashboardState {
    pub(crate) fn has_content(&self) -> bool {
        !self.tips.is_empty() || !self.statuses.is_empty() || !self.reminders.is_empty()
    }

    pub(crate) fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            tips: self.tips.clone(),
            statuses: self.statuses.clone(),
            reminders: self.reminders.clone(),
            loading: self.loading,
            error: self.error.clone(),
            has_completed_once: self.has_completed_once,
        }
    }
}

/// Point-in-time copy of everything the dashboard renders.
///
/// A missing entry in `statuses` means "not yet computed", never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub tips: Vec<Tip>,
    pub statuses: BTreeMap<PetId, Status>,
    pub reminders: Vec<Reminder>,
    pub loading: bool,
    pub error: Option<String>,
    /// Distinguishes the first-load empty state from a cycle that produced
    /// nothing.
    pub has_completed_once: bool,
}
