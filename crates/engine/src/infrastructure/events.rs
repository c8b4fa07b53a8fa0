//! Location event sinks.

use atlas_domain::LocationMutated;
use tokio::sync::mpsc;

use crate::infrastructure::ports::LocationEventSink;

/// Logs every committed mutation.
#[derive(Debug, Default)]
pub struct TracingEventSink;

impl LocationEventSink for TracingEventSink {
    fn location_mutated(&self, event: LocationMutated) {
        tracing::info!(
            location_id = %event.location_id,
            campaign_id = %event.campaign_id,
            action = %event.action,
            actor = %event.actor,
            promoted = event.promoted_children.len(),
            "Location mutated"
        );
    }
}

/// Forwards committed mutations to an audit consumer.
pub struct ChannelEventSink {
    sender: mpsc::UnboundedSender<LocationMutated>,
}

impl ChannelEventSink {
    /// Create a sink and the receiving half for the consumer.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LocationMutated>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl LocationEventSink for ChannelEventSink {
    fn location_mutated(&self, event: LocationMutated) {
        if let Err(e) = self.sender.send(event) {
            tracing::debug!(
                location_id = %e.0.location_id,
                "Location event dropped, consumer has gone away"
            );
        }
    }
}
