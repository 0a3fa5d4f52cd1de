use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

type Handler = Closure<dyn FnMut(Event)>;

const MOVE_EVENTS: &[&str] = &["pointermove", "touchmove"];
const END_EVENTS: &[&str] = &["pointerup", "touchend"];
const CANCEL_EVENTS: &[&str] = &["pointercancel", "touchcancel"];

/// Window-level move/end/cancel listeners that live only for one drag
/// session. Dropping the guard removes them from the target.
pub struct WindowListeners {
    target: EventTarget,
    handlers: Vec<(&'static [&'static str], Handler)>,
}

impl WindowListeners {
    pub fn attach(
        target: EventTarget,
        on_move: impl FnMut(Event) + 'static,
        on_end: impl FnMut(Event) + 'static,
        on_cancel: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let mut guard = WindowListeners {
            target,
            handlers: Vec::with_capacity(3),
        };
        // On error the partially built guard drops and detaches what it added.
        guard.add(MOVE_EVENTS, Closure::<dyn FnMut(Event)>::wrap(Box::new(on_move)))?;
        guard.add(END_EVENTS, Closure::<dyn FnMut(Event)>::wrap(Box::new(on_end)))?;
        guard.add(CANCEL_EVENTS, Closure::<dyn FnMut(Event)>::wrap(Box::new(on_cancel)))?;
        Ok(guard)
    }

    fn add(&mut self, names: &'static [&'static str], cb: Handler) -> Result<(), JsValue> {
        let result = names.iter().try_for_each(|name| {
            self.target
                .add_event_listener_with_callback(name, cb.as_ref().unchecked_ref())
        });
        self.handlers.push((names, cb));
        result
    }

    fn detach(&self) {
        for (names, cb) in &self.handlers {
            for name in names.iter() {
                let _ = self
                    .target
                    .remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
            }
        }
    }

    /// Detach now, free the closures on the next microtask. Needed when the
    /// release happens inside one of the guarded handlers.
    pub fn release(mut self) {
        self.detach();
        let handlers = std::mem::take(&mut self.handlers);
        wasm_bindgen_futures::spawn_local(async move {
            drop(handlers);
        });
    }
}

impl Drop for WindowListeners {
    fn drop(&mut self) {
        self.detach();
    }
}
