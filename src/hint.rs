use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;

/// Default time the player gets before a hint appears.
pub const DEFAULT_HINT_DELAY: Duration = Duration::from_secs(5);

/// Presentation side of the hint system: a marker over the target
/// entity plus an instruction line. Implemented by the embedder.
pub trait HintSurface {
    fn set_text(&self, text: &str);
    fn clear_text(&self);
    fn show_marker(&self, entity: &str);
    fn hide_marker(&self, entity: &str);
}

/// Surface that just logs, for headless runs.
#[derive(Debug, Default)]
pub struct LogHintSurface;

impl HintSurface for LogHintSurface {
    fn set_text(&self, text: &str) {
        log::info!("hint: {text}");
    }

    fn clear_text(&self) {
        debug!("hint text cleared");
    }

    fn show_marker(&self, entity: &str) {
        log::info!("hint marker shown over {entity}");
    }

    fn hide_marker(&self, entity: &str) {
        debug!("hint marker hidden for {entity}");
    }
}

/// Recording surface for tests.
#[derive(Debug, Default, Clone)]
pub struct MemoryHintSurface {
    log: Arc<Mutex<Vec<String>>>,
}

impl MemoryHintSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

impl HintSurface for MemoryHintSurface {
    fn set_text(&self, text: &str) {
        self.log.lock().push(format!("text:{text}"));
    }

    fn clear_text(&self) {
        self.log.lock().push("text-cleared".to_string());
    }

    fn show_marker(&self, entity: &str) {
        self.log.lock().push(format!("marker:{entity}"));
    }

    fn hide_marker(&self, entity: &str) {
        self.log.lock().push(format!("marker-hidden:{entity}"));
    }
}

#[derive(Debug)]
struct PendingHint {
    deadline: Instant,
    target: String,
    text: String,
}

/// One-shot hint timer, polled from the tick loop. A canceled hint can
/// never fire afterwards because cancellation drops the pending slot.
#[derive(Debug, Default)]
pub struct HintScheduler {
    pending: Option<PendingHint>,
    visible: Option<String>,
}

impl HintScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer for a target entity, replacing any pending hint.
    pub fn schedule(&mut self, now: Instant, delay: Duration, target: &str, text: &str) {
        self.pending = Some(PendingHint {
            deadline: now + delay,
            target: target.to_string(),
            text: text.to_string(),
        });
    }

    /// Fires the hint once its deadline passes. Returns true on the tick
    /// the hint becomes visible.
    pub fn poll(&mut self, now: Instant, surface: &dyn HintSurface) -> bool {
        let hint = match self.pending.take() {
            Some(hint) if now >= hint.deadline => hint,
            other => {
                self.pending = other;
                return false;
            }
        };
        debug!("hint fired for {}", hint.target);
        surface.show_marker(&hint.target);
        surface.set_text(&hint.text);
        self.visible = Some(hint.target);
        true
    }

    /// Disarms the timer and tears down anything already shown.
    /// Safe to call at any point, any number of times.
    pub fn cancel(&mut self, surface: &dyn HintSurface) {
        self.pending = None;
        if let Some(target) = self.visible.take() {
            surface.hide_marker(&target);
            surface.clear_text();
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible.is_some()
    }

    pub fn visible_target(&self) -> Option<&str> {
        self.visible.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_fires_only_after_the_delay() {
        let surface = MemoryHintSurface::new();
        let mut hints = HintScheduler::new();
        let start = Instant::now();
        hints.schedule(start, Duration::from_secs(5), "shoes", "Check the shoes");

        assert!(!hints.poll(start + Duration::from_secs(4), &surface));
        assert!(surface.entries().is_empty());

        assert!(hints.poll(start + Duration::from_secs(5), &surface));
        assert_eq!(
            surface.entries(),
            vec!["marker:shoes".to_string(), "text:Check the shoes".to_string()]
        );
        assert!(hints.is_visible());

        // already fired, does not fire again
        assert!(!hints.poll(start + Duration::from_secs(6), &surface));
    }

    #[test]
    fn canceled_hint_never_fires() {
        let surface = MemoryHintSurface::new();
        let mut hints = HintScheduler::new();
        let start = Instant::now();
        hints.schedule(start, Duration::from_secs(5), "shoes", "Check the shoes");
        hints.cancel(&surface);
        assert!(!hints.poll(start + Duration::from_secs(60), &surface));
        assert!(surface.entries().is_empty());
    }

    #[test]
    fn cancel_is_idempotent_and_tears_down_visible_hints() {
        let surface = MemoryHintSurface::new();
        let mut hints = HintScheduler::new();
        let start = Instant::now();
        hints.schedule(start, Duration::ZERO, "shoes", "Check the shoes");
        assert!(hints.poll(start, &surface));

        hints.cancel(&surface);
        hints.cancel(&surface);
        hints.cancel(&surface);

        let entries = surface.entries();
        assert_eq!(
            entries[2..],
            ["marker-hidden:shoes".to_string(), "text-cleared".to_string()]
        );
        assert!(!hints.is_visible());
    }

    #[test]
    fn rescheduling_replaces_the_pending_hint() {
        let surface = MemoryHintSurface::new();
        let mut hints = HintScheduler::new();
        let start = Instant::now();
        hints.schedule(start, Duration::from_secs(5), "shoes", "old");
        hints.schedule(start, Duration::from_secs(5), "books", "new");
        assert!(hints.poll(start + Duration::from_secs(5), &surface));
        assert_eq!(hints.visible_target(), Some("books"));
    }
}
