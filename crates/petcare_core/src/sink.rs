//! Presentation sinks: where the aggregation engine pushes dashboard updates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::id::PetId;
use crate::types::{Reminder, Status, Tip};

/// Consumer of incremental dashboard updates.
///
/// The engine awaits each call before making the next, so a sink observes
/// updates in publication order. Sinks never pull state.
#[async_trait]
pub trait PresentationSink: Send + Sync {
    async fn on_tips_updated(&self, tips: &[Tip]);

    async fn on_status_updated(&self, pet_id: &PetId, status: &Status);

    async fn on_reminders_updated(&self, reminders: &[Reminder]);

    async fn on_loading_changed(&self, loading: bool);

    async fn on_error_changed(&self, error: Option<&str>);
}

/// Owned form of a single sink notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkEvent {
    Tips(Vec<Tip>),
    Status { pet_id: PetId, status: Status },
    Reminders(Vec<Reminder>),
    Loading(bool),
    Error(Option<String>),
}

/// Sink that forwards every notification over an unbounded channel, for
/// presentation layers running on another task.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: SinkEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Presentation receiver dropped, discarding dashboard update");
        }
    }
}

#[async_trait]
impl PresentationSink for ChannelSink {
    async fn on_tips_updated(&self, tips: &[Tip]) {
        self.send(SinkEvent::Tips(tips.to_vec()));
    }

    async fn on_status_updated(&self, pet_id: &PetId, status: &Status) {
        self.send(SinkEvent::Status {
            pet_id: pet_id.clone(),
            status: status.clone(),
        });
    }

    async fn on_reminders_updated(&self, reminders: &[Reminder]) {
        self.send(SinkEvent::Reminders(reminders.to_vec()));
    }

    async fn on_loading_changed(&self, loading: bool) {
        self.send(SinkEvent::Loading(loading));
    }

    async fn on_error_changed(&self, error: Option<&str>) {
        self.send(SinkEvent::Error(error.map(str::to_string)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_preserves_order() {
        let (sink, mut rx) = ChannelSink::new();

        sink.on_loading_changed(true).await;
        sink.on_error_changed(Some("offline")).await;
        sink.on_loading_changed(false).await;

        assert_eq!(rx.recv().await, Some(SinkEvent::Loading(true)));
        assert_eq!(
            rx.recv().await,
            Some(SinkEvent::Error(Some("offline".to_string())))
        );
        assert_eq!(rx.recv().await, Some(SinkEvent::Loading(false)));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_tolerated() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.on_tips_updated(&[]).await;
    }
}
