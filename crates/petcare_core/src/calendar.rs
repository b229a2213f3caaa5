//! Calendar event access.
//!
//! The dashboard only reads calendar events; the provider owns storage and
//! permission prompts.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};

use crate::error::CalendarError;
use crate::types::{CalendarEvent, DateRange, Pet};

/// Source of calendar events for a pet.
#[async_trait]
pub trait CalendarEventProvider: Send + Sync {
    /// Lazily yield the pet's events that fall within `range`.
    ///
    /// Implementations may return [`CalendarError::NotAuthorized`] when the
    /// user declined access; callers treat that the same as an empty result.
    async fn load_events(
        &self,
        pet: &Pet,
        range: DateRange,
    ) -> Result<BoxStream<'static, CalendarEvent>, CalendarError>;
}

/// In-memory provider backed by a fixed event list.
#[derive(Debug)]
pub struct StaticCalendar {
    events: Vec<CalendarEvent>,
    authorized: bool,
}

impl StaticCalendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events,
            authorized: true,
        }
    }

    /// A provider whose user never granted calendar access.
    pub fn unauthorized() -> Self {
        Self {
            events: Vec::new(),
            authorized: false,
        }
    }
}

impl Default for StaticCalendar {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait]
impl CalendarEventProvider for StaticCalendar {
    async fn load_events(
        &self,
        pet: &Pet,
        range: DateRange,
    ) -> Result<BoxStream<'static, CalendarEvent>, CalendarError> {
        if !self.authorized {
            return Err(CalendarError::NotAuthorized);
        }

        let matching: Vec<CalendarEvent> = self
            .events
            .iter()
            .filter(|event| event.pet_id == pet.id && range.contains(event.starts_at))
            .cloned()
            .collect();

        Ok(stream::iter(matching).boxed())
    }
}
