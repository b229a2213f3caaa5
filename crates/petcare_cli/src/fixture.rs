//! JSON fixture standing in for the pet store and the device calendar.
//!
//! The file is re-read on every access so edits show up on the next
//! scheduled refresh while `watch` is running.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use miette::Result;
use petcare_core::{CalendarError, CalendarEvent, CalendarEventProvider, DateRange, Pet, PetDirectory};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fixture {
    pub pets: Vec<Pet>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    /// Set to `false` to simulate a user who declined calendar access.
    #[serde(default = "default_authorized")]
    pub calendar_authorized: bool,
}

fn default_authorized() -> bool {
    true
}

impl Fixture {
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| miette::miette!("Failed to read fixture {}: {}", path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| miette::miette!("Failed to parse fixture {}: {}", path.display(), e))
    }
}

/// Calendar provider backed by a fixture file.
#[derive(Debug, Clone)]
pub struct FixtureCalendar {
    path: PathBuf,
}

impl FixtureCalendar {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CalendarEventProvider for FixtureCalendar {
    async fn load_events(
        &self,
        pet: &Pet,
        range: DateRange,
    ) -> std::result::Result<BoxStream<'static, CalendarEvent>, CalendarError> {
        let fixture = Fixture::load(&self.path)
            .await
            .map_err(|e| CalendarError::Unavailable(e.to_string()))?;
        if !fixture.calendar_authorized {
            return Err(CalendarError::NotAuthorized);
        }

        let pet_id = pet.id.clone();
        let events = fixture
            .events
            .into_iter()
            .filter(move |event| event.pet_id == pet_id && range.contains(event.starts_at));
        Ok(stream::iter(events).boxed())
    }
}

/// Pet list read from the same fixture file.
#[derive(Debug, Clone)]
pub struct FixturePets {
    path: PathBuf,
}

impl FixturePets {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PetDirectory for FixturePets {
    async fn pets(&self) -> Vec<Pet> {
        match Fixture::load(&self.path).await {
            Ok(fixture) => fixture.pets,
            Err(e) => {
                warn!(error = %e, "Fixture unreadable, treating pet list as empty");
                Vec::new()
            }
        }
    }
}
