use std::collections::HashSet;

use glam::Vec2;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// An edge-triggered pointer event. Pick and release react to the edge,
/// not the held state, so these queue up between ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed { button: MouseButton, position: Vec2 },
    Released { button: MouseButton, position: Vec2 },
    Moved { position: Vec2 },
    Wheel { delta: f32, position: Vec2 },
}

/// Thread-safe input snapshot plus the queue of edges since the last
/// tick. The embedder pushes from its event loop; the session drains
/// once per tick.
#[derive(Debug, Default)]
pub struct InputState {
    buttons: RwLock<HashSet<MouseButton>>,
    pointer: RwLock<Vec2>,
    events: Mutex<Vec<PointerEvent>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button_down(&self, button: MouseButton) {
        self.buttons.write().insert(button);
        self.events.lock().push(PointerEvent::Pressed {
            button,
            position: self.pointer_position(),
        });
    }

    pub fn set_button_up(&self, button: MouseButton) {
        self.buttons.write().remove(&button);
        self.events.lock().push(PointerEvent::Released {
            button,
            position: self.pointer_position(),
        });
    }

    pub fn set_pointer_position(&self, position: Vec2) {
        *self.pointer.write() = position;
        self.events.lock().push(PointerEvent::Moved { position });
    }

    pub fn scroll(&self, delta: f32) {
        self.events.lock().push(PointerEvent::Wheel {
            delta,
            position: self.pointer_position(),
        });
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.read().contains(&button)
    }

    pub fn pointer_position(&self) -> Vec2 {
        *self.pointer.read()
    }

    /// Takes every event queued since the last drain, in arrival order.
    pub fn drain_events(&self) -> Vec<PointerEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}
