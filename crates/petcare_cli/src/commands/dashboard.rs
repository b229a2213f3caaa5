use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use miette::{IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use petcare_core::config::DashboardConfig;
use petcare_core::{
    AggregationEngine, ChannelSink, PetDirectory, RefreshPriority, RefreshScheduler,
    RuleBasedGenerator, RunOutcome, SessionFlag, SinkEvent, ThrottledGenerator,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::info;

use crate::fixture::{Fixture, FixtureCalendar, FixturePets};
use crate::output::Output;
use crate::render;

fn build_engine(
    config: &DashboardConfig,
    fixture: &Path,
) -> (AggregationEngine, UnboundedReceiver<SinkEvent>) {
    let generator = ThrottledGenerator::new(
        RuleBasedGenerator::new(),
        config.generation.min_call_spacing(),
        config.generation.retry.clone(),
    );
    let (sink, rx) = ChannelSink::new();
    let engine = AggregationEngine::new(
        Arc::new(FixtureCalendar::new(fixture)),
        Arc::new(generator),
        config.calendar.clone(),
    )
    .with_sink(Arc::new(sink));
    (engine, rx)
}

/// Print updates until every sender is gone.
fn spawn_printer(mut rx: UnboundedReceiver<SinkEvent>, output: Output) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            render::event(&output, &event);
        }
    })
}

fn report(outcome: &RunOutcome, output: &Output) {
    match outcome {
        RunOutcome::Completed(summary) => {
            output.success(&format!(
                "Refreshed {} pet(s): {} tip(s), {} reminder(s)",
                summary.pets_processed, summary.tips_generated, summary.reminders_total
            ));
            if summary.tip_failures > 0 || summary.reminder_failures > 0 {
                output.warning(&format!(
                    "{} tip and {} reminder generation(s) failed",
                    summary.tip_failures, summary.reminder_failures
                ));
            }
        }
        RunOutcome::Skipped(reason) => {
            output.warning(&format!("Refresh skipped: {reason:?}"));
        }
    }
}

/// One interactive refresh, then the resulting dashboard.
pub async fn refresh(config: &DashboardConfig, fixture: &Path, output: &Output) -> Result<()> {
    let pets = Fixture::load(fixture).await?.pets;
    output.info("Fixture:", &fixture.display().to_string());

    let (engine, rx) = build_engine(config, fixture);
    let printer = spawn_printer(rx, output.clone());

    let outcome = engine.run(&pets, RefreshPriority::Interactive).await;
    let snapshot = engine.snapshot();
    drop(engine);
    printer.await.into_diagnostic()?;

    report(&outcome, output);
    render::snapshot(output, &snapshot);
    Ok(())
}

/// Refresh now, then keep refreshing on the configured interval until
/// Ctrl-C.
pub async fn watch(
    config: &DashboardConfig,
    fixture: &Path,
    interval_secs: Option<u64>,
    output: &Output,
) -> Result<()> {
    let interval = interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.refresh.interval());
    let pets = Arc::new(FixturePets::new(fixture));

    let (engine, rx) = build_engine(config, fixture);
    let engine = Arc::new(engine);
    let printer = spawn_printer(rx, output.clone());

    let scheduler = RefreshScheduler::new(
        engine.clone(),
        pets.clone(),
        Arc::new(SessionFlag::new(true)),
        interval,
    )?;

    let initial = pets.pets().await;
    let outcome = engine.run(&initial, RefreshPriority::Interactive).await;
    report(&outcome, output);

    scheduler.start();
    output.status(&format!(
        "Refreshing every {}s, press {} to stop",
        interval.as_secs(),
        "Ctrl-C".bright_green()
    ));

    tokio::signal::ctrl_c().await.into_diagnostic()?;
    info!("Stopping dashboard refresh");
    scheduler.shutdown().await;
    drop(scheduler);

    let snapshot = engine.snapshot();
    drop(engine);
    printer.await.into_diagnostic()?;

    render::snapshot(output, &snapshot);
    Ok(())
}
