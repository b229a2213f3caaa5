//! Petcare Core - Home dashboard content aggregation
//!
//! This crate provides the pipeline that fills the home dashboard with
//! generated care tips, per-pet health statuses and deduplicated reminders,
//! plus the background scheduler that keeps them fresh.

pub mod calendar;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod generation;
pub mod id;
pub mod reminders;
pub mod sink;
pub mod types;

#[cfg(test)]
pub mod test_helpers;

pub use calendar::{CalendarEventProvider, StaticCalendar};
pub use config::DashboardConfig;
pub use dashboard::{
    AggregationEngine, DashboardSnapshot, PetDirectory, RefreshPriority, RefreshScheduler,
    RunOutcome, RunSummary, SessionFlag, SessionGate, SkipReason, TickOutcome,
};
pub use error::{CalendarError, ConfigError, CoreError, Result};
pub use generation::{ContentGenerator, RetryConfig, RuleBasedGenerator, ThrottledGenerator};
pub use id::PetId;
pub use sink::{ChannelSink, PresentationSink, SinkEvent};
pub use types::{
    CalendarEvent, CalendarEventKind, DateRange, Pet, PillColor, Reminder, ReminderKey, Status,
    StatusPill, Tip,
};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        AggregationEngine, CalendarEventProvider, ContentGenerator, CoreError, DashboardSnapshot,
        Pet, PetId, PresentationSink, RefreshPriority, RefreshScheduler, Result,
    };
}
