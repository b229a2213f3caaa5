use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures::StreamExt;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::state::{DashboardSnapshot, DashboardState};
use crate::calendar::CalendarEventProvider;
use crate::config::CalendarConfig;
use crate::error::{CalendarError, CoreError};
use crate::generation::ContentGenerator;
use crate::id::PetId;
use crate::reminders;
use crate::sink::PresentationSink;
use crate::types::{CalendarEvent, DateRange, Pet, Reminder, Status, Tip};

/// User-facing message when a cycle produced no tips and none were shown.
pub const GENERATION_UNAVAILABLE: &str =
    "We couldn't load personalized insights right now. Tap to try again.";

/// Who asked for a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshPriority {
    /// Explicit user action: always shows the loading indicator.
    Interactive,
    /// Timer-driven: keeps stale content on screen without a spinner.
    Background,
}

impl RefreshPriority {
    fn shows_loading(self, has_content: bool) -> bool {
        match self {
            RefreshPriority::Interactive => true,
            RefreshPriority::Background => !has_content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoPets,
    AlreadyRunning,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pets_processed: usize,
    pub tips_generated: usize,
    pub tip_failures: usize,
    pub reminder_failures: usize,
    pub reminders_total: usize,
    /// Error left on the dashboard after the run.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Skipped(SkipReason),
    Completed(RunSummary),
}

/// Drives per-pet content generation and owns the dashboard state.
pub struct AggregationEngine {
    calendar: Arc<dyn CalendarEventProvider>,
    generator: Arc<dyn ContentGenerator>,
    window: CalendarConfig,
    sinks: Vec<Arc<dyn PresentationSink>>,
    state: Mutex<DashboardState>,
    /// Set for the whole run; a second caller is dropped instead of
    /// interleaving with the first.
    running: AtomicBool,
}

/// Releases the run when it ends, including when the run future is dropped
/// midway. A dropped run leaves `loading_published` set so the next run
/// tells the sinks to clear their loading indicator.
struct RunGuard<'a> {
    running: &'a AtomicBool,
    state: &'a Mutex<DashboardState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().loading = false;
        self.running.store(false, Ordering::Release);
    }
}

impl AggregationEngine {
    pub fn new(
        calendar: Arc<dyn CalendarEventProvider>,
        generator: Arc<dyn ContentGenerator>,
        window: CalendarConfig,
    ) -> Self {
        Self {
            calendar,
            generator,
            window,
            sinks: Vec::new(),
            state: Mutex::new(DashboardState::default()),
            running: AtomicBool::new(false),
        }
    }

    /// Add a sink to receive dashboard updates
    pub fn with_sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state.lock().snapshot()
    }

    /// True while a run is in flight.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn try_begin_run(&self) -> Option<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard {
                running: &self.running,
                state: &self.state,
            })
    }

    /// The inline "retry" action offered next to the pipeline error.
    pub async fn retry(&self, pets: &[Pet]) -> RunOutcome {
        self.run(pets, RefreshPriority::Interactive).await
    }

    /// Regenerate tips, statuses and reminders for `pets`, in list order.
    ///
    /// Per-pet failures never abort the run. The only error surfaced to the
    /// sinks is "no tips this cycle and none from before".
    pub async fn run(&self, pets: &[Pet], priority: RefreshPriority) -> RunOutcome {
        if pets.is_empty() {
            debug!("Dashboard refresh skipped: no pets");
            return RunOutcome::Skipped(SkipReason::NoPets);
        }

        let Some(_guard) = self.try_begin_run() else {
            debug!(?priority, "Dashboard refresh skipped: a run is already in flight");
            return RunOutcome::Skipped(SkipReason::AlreadyRunning);
        };

        info!(pets = pets.len(), ?priority, "Dashboard refresh started");

        let (show_loading, had_error, prior_tips) = {
            let mut state = self.state.lock();
            let show_loading = priority.shows_loading(state.has_content());
            if show_loading {
                state.loading = true;
                state.loading_published = true;
            }
            let had_error = state.error.take().is_some();
            (show_loading, had_error, state.tips.clone())
        };
        if show_loading {
            self.publish_loading(true).await;
        }
        if had_error {
            self.publish_error(None).await;
        }

        let events = self.load_calendar(pets).await;

        let mut summary = RunSummary::default();
        let mut batch: Vec<Tip> = Vec::new();

        for (pet, events) in pets.iter().zip(events.iter()) {
            debug!(pet_id = %pet.id, events = events.len(), "Generating dashboard content");

            match self.generator.generate_tip(pet, events).await {
                Ok(Some(mut tip)) => {
                    tip.pet_id = pet.id.clone();
                    batch.push(tip);
                    let cumulative: Vec<Tip> =
                        prior_tips.iter().chain(batch.iter()).cloned().collect();
                    self.state.lock().tips = cumulative.clone();
                    self.publish_tips(&cumulative).await;
                }
                Ok(None) => {
                    summary.tip_failures += 1;
                    warn!(pet_id = %pet.id, "Tip generation returned nothing");
                }
                Err(e) => {
                    summary.tip_failures += 1;
                    warn!(pet_id = %pet.id, error = %e, "Tip generation failed");
                }
            }

            let status = self.generator.generate_status(pet, events).await;
            self.state
                .lock()
                .statuses
                .insert(pet.id.clone(), status.clone());
            self.publish_status(&pet.id, &status).await;

            match self.generator.generate_reminders(pet, events).await {
                Ok(incoming) => {
                    let incoming: Vec<Reminder> = incoming
                        .into_iter()
                        .map(|mut reminder| {
                            reminder.pet_id = pet.id.clone();
                            reminder
                        })
                        .collect();
                    let merged = {
                        let mut state = self.state.lock();
                        let merged = reminders::merge(&state.reminders, &incoming);
                        state.reminders = merged.clone();
                        merged
                    };
                    self.publish_reminders(&merged).await;
                }
                Err(e) => {
                    summary.reminder_failures += 1;
                    warn!(pet_id = %pet.id, error = %e, "Reminder generation failed");
                }
            }

            summary.pets_processed += 1;
        }

        summary.tips_generated = batch.len();

        let final_tips = if batch.is_empty() {
            prior_tips.clone()
        } else {
            replace_tips_by_pet(&prior_tips, batch)
        };
        let error = if summary.tips_generated == 0 && prior_tips.is_empty() {
            Some(GENERATION_UNAVAILABLE.to_string())
        } else {
            if summary.tips_generated == 0 {
                // Prior tips stay on screen; a total outage is only visible here.
                warn!(
                    failures = summary.tip_failures,
                    "No tips generated this cycle, keeping previous tips"
                );
            }
            None
        };

        let (tips_changed, reminders_total, clear_loading) = {
            let mut state = self.state.lock();
            let tips_changed = state.tips != final_tips;
            state.tips = final_tips.clone();
            state.error = error.clone();
            state.loading = false;
            state.has_completed_once = true;
            (tips_changed, state.reminders.len(), state.loading_published)
        };
        summary.reminders_total = reminders_total;
        summary.error = error.clone();

        if tips_changed {
            self.publish_tips(&final_tips).await;
        }
        if let Some(message) = error.as_deref() {
            self.publish_error(Some(message)).await;
        }
        if clear_loading {
            self.publish_loading(false).await;
            self.state.lock().loading_published = false;
        }

        info!(
            tips = summary.tips_generated,
            tip_failures = summary.tip_failures,
            reminder_failures = summary.reminder_failures,
            reminders = summary.reminders_total,
            "Dashboard refresh finished"
        );

        RunOutcome::Completed(summary)
    }

    /// Load every pet's events up front; generation steps reuse them.
    async fn load_calendar(&self, pets: &[Pet]) -> Vec<Vec<CalendarEvent>> {
        let range = DateRange::around(
            Utc::now(),
            self.window.lookbehind_days,
            self.window.lookahead_days,
        );

        join_all(pets.iter().map(|pet| async move {
            match self.calendar.load_events(pet, range).await {
                Ok(stream) => {
                    stream
                        .filter(|event| futures::future::ready(event.pet_id == pet.id))
                        .collect::<Vec<_>>()
                        .await
                }
                Err(CalendarError::NotAuthorized) => {
                    debug!(pet_id = %pet.id, "Calendar access not granted, continuing without events");
                    Vec::new()
                }
                Err(cause) => {
                    let error = CoreError::Calendar {
                        pet_id: pet.id.clone(),
                        cause,
                    };
                    warn!(error = ?error, "Calendar load failed, continuing without events");
                    Vec::new()
                }
            }
        }))
        .await
    }

    async fn publish_tips(&self, tips: &[Tip]) {
        for sink in &self.sinks {
            sink.on_tips_updated(tips).await;
        }
    }

    async fn publish_status(&self, pet_id: &PetId, status: &Status) {
        for sink in &self.sinks {
            sink.on_status_updated(pet_id, status).await;
        }
    }

    async fn publish_reminders(&self, reminders: &[Reminder]) {
        for sink in &self.sinks {
            sink.on_reminders_updated(reminders).await;
        }
    }

    async fn publish_loading(&self, loading: bool) {
        for sink in &self.sinks {
            sink.on_loading_changed(loading).await;
        }
    }

    async fn publish_error(&self, error: Option<&str>) {
        for sink in &self.sinks {
            sink.on_error_changed(error).await;
        }
    }
}

/// New tips first, then prior tips for pets that got nothing new.
fn replace_tips_by_pet(prior: &[Tip], batch: Vec<Tip>) -> Vec<Tip> {
    let refreshed: HashSet<&PetId> = batch.iter().map(|tip| &tip.pet_id).collect();
    let kept: Vec<Tip> = prior
        .iter()
        .filter(|tip| !refreshed.contains(&tip.pet_id))
        .cloned()
        .collect();
    batch.into_iter().chain(kept).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::StaticCalendar;
    use crate::sink::{ChannelSink, SinkEvent};
    use crate::test_helpers::generation::ScriptedGenerator;
    use crate::test_helpers::pets::{luna, max};
    use pretty_assertions::assert_eq;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tracing_test::traced_test;

    fn engine(generator: ScriptedGenerator) -> (AggregationEngine, UnboundedReceiver<SinkEvent>) {
        let (sink, rx) = ChannelSink::new();
        let engine = AggregationEngine::new(
            Arc::new(StaticCalendar::default()),
            Arc::new(generator),
            CalendarConfig::default(),
        )
        .with_sink(Arc::new(sink));
        (engine, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<SinkEvent>) -> Vec<SinkEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_background_priority_hides_loading_only_with_content() {
        assert!(RefreshPriority::Interactive.shows_loading(true));
        assert!(RefreshPriority::Background.shows_loading(false));
        assert!(!RefreshPriority::Background.shows_loading(true));
    }

    #[test]
    fn test_replace_tips_by_pet_keeps_untouched_pets() {
        let prior = vec![
            Tip::new("max", "🐶", "Old max", ""),
            Tip::new("luna", "🐱", "Old luna", ""),
        ];
        let batch = vec![Tip::new("max", "🐶", "New max", "")];

        let titles: Vec<String> = replace_tips_by_pet(&prior, batch)
            .into_iter()
            .map(|tip| tip.title)
            .collect();

        assert_eq!(titles, vec!["New max", "Old luna"]);
    }

    #[tokio::test]
    async fn test_empty_pet_list_is_a_silent_no_op() {
        let generator = ScriptedGenerator::default();
        let calls = generator.calls();
        let (engine, mut rx) = engine(generator);

        let outcome = engine.run(&[], RefreshPriority::Interactive).await;

        assert_eq!(outcome, RunOutcome::Skipped(SkipReason::NoPets));
        assert_eq!(calls.total(), 0);
        assert!(drain(&mut rx).is_empty());
        assert!(!engine.snapshot().has_completed_once);
    }

    #[tokio::test]
    async fn test_background_run_with_content_never_shows_loading() {
        let (engine, mut rx) = engine(ScriptedGenerator::default());
        engine.run(&[max()], RefreshPriority::Interactive).await;
        drain(&mut rx);

        engine.run(&[max()], RefreshPriority::Background).await;

        let events = drain(&mut rx);
        assert!(!events.iter().any(|e| matches!(e, SinkEvent::Loading(_))));
        assert!(!engine.snapshot().loading);
    }

    #[tokio::test]
    async fn test_tip_id_is_stamped_with_pet() {
        let generator = ScriptedGenerator::default().with_foreign_tip_ids();
        let (engine, _rx) = engine(generator);

        engine.run(&[max(), luna()], RefreshPriority::Interactive).await;

        let ids: Vec<_> = engine
            .snapshot()
            .tips
            .into_iter()
            .map(|tip| tip.pet_id)
            .collect();
        assert_eq!(ids, vec![max().id, luna().id]);
    }

    #[tokio::test]
    async fn test_concurrent_run_is_dropped() {
        let generator = ScriptedGenerator::default().gated();
        let gate = generator.gate();
        let (engine, _rx) = engine(generator);
        let engine = Arc::new(engine);

        let first = tokio::spawn({
            let engine = engine.clone();
            async move { engine.run(&[max()], RefreshPriority::Background).await }
        });
        gate.wait_entered().await;

        assert!(engine.is_running());
        let second = engine.run(&[max()], RefreshPriority::Interactive).await;
        assert_eq!(second, RunOutcome::Skipped(SkipReason::AlreadyRunning));

        gate.release();
        let first = first.await.unwrap();
        assert!(matches!(first, RunOutcome::Completed(_)));
        assert!(!engine.is_running());
    }

    #[tokio::test]
    async fn test_aborted_run_releases_guard_and_loading() {
        let generator = ScriptedGenerator::default().gated();
        let gate = generator.gate();
        let (engine, mut rx) = engine(generator);
        let engine = Arc::new(engine);

        let run = tokio::spawn({
            let engine = engine.clone();
            async move { engine.run(&[max()], RefreshPriority::Interactive).await }
        });
        gate.wait_entered().await;
        assert!(engine.snapshot().loading);

        run.abort();
        assert!(run.await.unwrap_err().is_cancelled());

        assert!(!engine.is_running());
        assert!(!engine.snapshot().loading);
        assert!(!engine.snapshot().has_completed_once);
        assert_eq!(drain(&mut rx), vec![SinkEvent::Loading(true)]);

        gate.release();
        engine.run(&[max()], RefreshPriority::Interactive).await;
        assert_eq!(drain(&mut rx).last(), Some(&SinkEvent::Loading(false)));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_reminder_failure_is_isolated_and_logged() {
        let generator = ScriptedGenerator::default().failing_reminders_for("max");
        let (engine, _rx) = engine(generator);

        let outcome = engine.run(&[max(), luna()], RefreshPriority::Interactive).await;

        let RunOutcome::Completed(summary) = outcome else {
            panic!("expected completed run");
        };
        assert_eq!(summary.reminder_failures, 1);
        assert_eq!(summary.pets_processed, 2);
        assert_eq!(summary.error, None);
        assert!(logs_contain("Reminder generation failed"));
        assert!(
            engine
                .snapshot()
                .reminders
                .iter()
                .all(|r| r.pet_id == luna().id)
        );
    }

    #[tokio::test]
    async fn test_previous_error_is_cleared_on_next_run() {
        let generator = ScriptedGenerator::default().failing_tips_for("max");
        let switch = generator.tip_switch();
        let (engine, mut rx) = engine(generator);

        engine.run(&[max()], RefreshPriority::Interactive).await;
        assert_eq!(
            engine.snapshot().error.as_deref(),
            Some(GENERATION_UNAVAILABLE)
        );
        drain(&mut rx);

        switch.recover();
        engine.retry(&[max()]).await;

        let events = drain(&mut rx);
        assert_eq!(events[0], SinkEvent::Loading(true));
        assert_eq!(events[1], SinkEvent::Error(None));
        assert_eq!(engine.snapshot().error, None);
    }
}
