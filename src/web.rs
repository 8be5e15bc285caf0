#![cfg(target_arch = "wasm32")]

use wasm_bindgen::prelude::*;
use web_sys::window;

use crate::events::{EventSink, GameEvent};
use crate::hint::HintSurface;

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
}

/// Forwards game events to the embedding page as `{type, message}`
/// messages, the shape the host page's listener expects.
#[derive(Debug, Default)]
pub struct PostMessageSink;

impl PostMessageSink {
    pub fn new() -> Self {
        Self
    }

    fn deliver(&self, event: &GameEvent) -> Result<(), JsValue> {
        let parent = window()
            .and_then(|win| win.parent().ok().flatten())
            .ok_or_else(|| JsValue::from_str("no parent window"))?;
        let message = js_sys::Object::new();
        js_sys::Reflect::set(&message, &"type".into(), &event.kind().into())?;
        js_sys::Reflect::set(&message, &"message".into(), &event.payload().into())?;
        parent.post_message(&message, "*")
    }
}

impl EventSink for PostMessageSink {
    fn emit(&self, event: &GameEvent) {
        if let Err(err) = self.deliver(event) {
            web_sys::console::warn_1(&err);
        }
    }
}

/// Hint surface backed by the browser console. The page renders its own
/// marker overlay; this keeps headless embeds observable.
#[derive(Debug, Default)]
pub struct ConsoleHintSurface;

impl HintSurface for ConsoleHintSurface {
    fn set_text(&self, text: &str) {
        web_sys::console::log_1(&format!("hint: {text}").into());
    }

    fn clear_text(&self) {
        web_sys::console::log_1(&"hint cleared".into());
    }

    fn show_marker(&self, entity: &str) {
        web_sys::console::log_1(&format!("hint marker: {entity}").into());
    }

    fn hide_marker(&self, entity: &str) {
        web_sys::console::log_1(&format!("hint marker hidden: {entity}").into());
    }
}
