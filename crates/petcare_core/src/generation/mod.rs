//! Content generation: the black-box service that turns a pet and its
//! calendar into tips, statuses and reminders.

mod rules;
mod throttle;

use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::types::{CalendarEvent, Pet, Reminder, Status, Tip};

pub use rules::{RuleBasedGenerator, status_for};
pub use throttle::{RetryConfig, ThrottledGenerator};

/// Produces the three dashboard artifacts for a single pet.
///
/// Implementations are free to rate limit themselves internally; the
/// aggregation engine only observes latency and failures.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Generate a care tip. `Ok(None)` means the service had nothing to say
    /// and counts as a failed tip for the cycle.
    async fn generate_tip(&self, pet: &Pet, events: &[CalendarEvent]) -> Result<Option<Tip>>;

    /// Generate the pet's health status. Never fails; implementations fall
    /// back to [`status_for`] or an equivalent.
    async fn generate_status(&self, pet: &Pet, events: &[CalendarEvent]) -> Status;

    /// Generate dated reminders for the pet.
    async fn generate_reminders(&self, pet: &Pet, events: &[CalendarEvent])
    -> Result<Vec<Reminder>>;
}

#[async_trait]
impl<G: ContentGenerator + ?Sized> ContentGenerator for Arc<G> {
    async fn generate_tip(&self, pet: &Pet, events: &[CalendarEvent]) -> Result<Option<Tip>> {
        (**self).generate_tip(pet, events).await
    }

    async fn generate_status(&self, pet: &Pet, events: &[CalendarEvent]) -> Status {
        (**self).generate_status(pet, events).await
    }

    async fn generate_reminders(
        &self,
        pet: &Pet,
        events: &[CalendarEvent],
    ) -> Result<Vec<Reminder>> {
        (**self).generate_reminders(pet, events).await
    }
}
