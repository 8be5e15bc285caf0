use std::sync::Arc;

use parking_lot::Mutex;

/// Progress notifications surfaced to the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A mission ran to completion.
    MissionCompleted { mission: String },
    /// A step finished and its follow-up task should open.
    TaskOpened { task: String },
}

impl GameEvent {
    /// Wire-level event name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissionCompleted { .. } => "mission:completed",
            Self::TaskOpened { .. } => "openTask",
        }
    }

    /// Wire-level event payload.
    pub fn payload(&self) -> &str {
        match self {
            Self::MissionCompleted { mission } => mission,
            Self::TaskOpened { task } => task,
        }
    }
}

/// Fire-and-forget outbound channel. Delivery failures are the sink's
/// problem; gameplay never blocks on them.
pub trait EventSink {
    fn emit(&self, event: &GameEvent);
}

/// Sink that logs, for headless runs.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &GameEvent) {
        log::info!("event {} -> {}", event.kind(), event.payload());
    }
}

/// Recording sink for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryEventSink {
    events: Arc<Mutex<Vec<GameEvent>>>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.events.lock().clone()
    }
}

impl EventSink for MemoryEventSink {
    fn emit(&self, event: &GameEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_carry_their_wire_names() {
        let done = GameEvent::MissionCompleted {
            mission: "1".to_string(),
        };
        assert_eq!(done.kind(), "mission:completed");
        assert_eq!(done.payload(), "1");

        let task = GameEvent::TaskOpened {
            task: "task2".to_string(),
        };
        assert_eq!(task.kind(), "openTask");
        assert_eq!(task.payload(), "task2");
    }

    #[test]
    fn memory_sink_records_in_order() {
        let sink = MemoryEventSink::new();
        sink.emit(&GameEvent::TaskOpened {
            task: "task1".to_string(),
        });
        sink.emit(&GameEvent::MissionCompleted {
            mission: "1".to_string(),
        });
        assert_eq!(sink.events().len(), 2);
        assert_eq!(sink.events()[0].kind(), "openTask");
    }
}
