//! Render events
//!
//! The orchestrator publishes one event per state machine step on a
//! broadcast channel. Slow subscribers lag and miss events instead of
//! holding up rendering.

use serde::Serialize;
use sketchpad_sandbox::ExecutionFault;
use tokio::sync::broadcast;

/// What caused an execution to be issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Debounced edit
    Edit,
    /// Viewport change
    Viewport,
    /// Manual regenerate request
    Regenerate,
    /// Project created or loaded
    Load,
}

/// Events emitted by the render orchestrator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderEvent {
    /// A new execution was issued
    ExecutionStarted {
        /// Sequence number of the execution
        seq: u64,
        /// Why it was issued
        trigger: Trigger,
    },
    /// The latest execution succeeded and the preview was updated
    Rendered {
        /// Sequence number of the execution
        seq: u64,
    },
    /// The latest execution failed; the preview was kept
    Faulted {
        /// Sequence number of the execution
        seq: u64,
        /// Classified failure
        fault: ExecutionFault,
    },
    /// A superseded execution finished and was ignored
    Discarded {
        /// Sequence number of the stale execution
        seq: u64,
    },
    /// The rendered project was handed to the store
    Persisted {
        /// Sequence number of the execution
        seq: u64,
        /// Whether the write reached durable storage
        durable: bool,
    },
}

impl RenderEvent {
    /// Sequence number carried by every event
    #[must_use]
    pub fn seq(&self) -> u64 {
        match self {
            Self::ExecutionStarted { seq, .. }
            | Self::Rendered { seq }
            | Self::Faulted { seq, .. }
            | Self::Discarded { seq }
            | Self::Persisted { seq, .. } => *seq,
        }
    }
}

/// Broadcast bus for render events
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RenderEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RenderEvent> {
        self.sender.subscribe()
    }

    /// Publish to all subscribers; returns how many received it
    pub fn publish(&self, event: RenderEvent) -> usize {
        // No subscribers is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of active subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchpad_sandbox::FaultKind;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(RenderEvent::ExecutionStarted {
            seq: 1,
            trigger: Trigger::Edit,
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(event.seq(), 1);
        assert!(matches!(
            event,
            RenderEvent::ExecutionStarted {
                trigger: Trigger::Edit,
                ..
            }
        ));
    }

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(RenderEvent::Discarded { seq: 3 }), 0);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization() {
        let event = RenderEvent::Faulted {
            seq: 2,
            fault: ExecutionFault::new(FaultKind::Compile, "Unexpected end of input"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"faulted\""));
        assert!(json.contains("\"kind\":\"compile\""));
    }
}
