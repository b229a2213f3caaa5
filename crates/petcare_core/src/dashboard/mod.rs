//! Home dashboard content aggregation.
//!
//! The [`AggregationEngine`] walks the pet list, asks the generator for each
//! pet's tip, status and reminders, and pushes every intermediate result to
//! the attached presentation sinks. The [`RefreshScheduler`] re-runs it in the
//! background on a fixed interval.

mod engine;
mod scheduler;
mod state;

pub use engine::{
    AggregationEngine, GENERATION_UNAVAILABLE, RefreshPriority, RunOutcome, RunSummary,
    SkipReason,
};
pub use scheduler::{PetDirectory, RefreshScheduler, SessionFlag, SessionGate, TickOutcome};
pub use state::DashboardSnapshot;
