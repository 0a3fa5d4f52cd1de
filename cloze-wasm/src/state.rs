use std::cell::RefCell;
use std::rc::Rc;

use cloze_core::{ClozeController, Dispatch, DragEvent, ExerciseView, ListenerCommand, Renderer};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, Window};

use crate::listeners::WindowListeners;
use crate::utils::{drop_target_at, event_client_point, log};

/// Holds the latest serialized view until it can be handed to JS outside of
/// any `RefCell` borrow.
#[derive(Default)]
pub struct QueuedRenderer {
    pending: Option<String>,
}

impl QueuedRenderer {
    pub fn take(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl Renderer for QueuedRenderer {
    fn render(&mut self, view: &ExerciseView) {
        match view.to_json() {
            Ok(json) => self.pending = Some(json),
            Err(e) => tracing::error!(error = %e, "view serialization failed"),
        }
    }
}

/// Per-widget runtime state shared with the window listener closures.
pub struct WidgetState {
    pub window: Window,
    pub document: Document,
    pub controller: ClozeController<QueuedRenderer>,
    pub listeners: Option<WindowListeners>,
    pub on_render: js_sys::Function,
}

pub type SharedState = Rc<RefCell<WidgetState>>;

/// Feed one drag event to the controller, then carry out the listener
/// command and push the new view.
pub fn dispatch(state: &SharedState, event: DragEvent) -> Result<Dispatch, JsValue> {
    let d = state.borrow_mut().controller.handle(event);
    let applied = apply_command(state, d.command);
    if applied.is_err() {
        // A session without listeners would never end; drop it.
        let _ = state.borrow_mut().controller.handle(DragEvent::Cancel);
    }
    flush(state);
    applied.map(|_| d)
}

/// Tear down whatever drag is in flight, e.g. when the widget is freed.
pub fn teardown(state: &SharedState) {
    let _ = state.borrow_mut().controller.teardown();
    release_listeners(state);
}

/// Hand the pending view, if any, to the JS render callback.
pub fn flush(state: &SharedState) {
    let (json, cb) = {
        let mut s = state.borrow_mut();
        (s.controller.renderer_mut().take(), s.on_render.clone())
    };
    if let Some(json) = json
        && let Err(e) = cb.call1(&JsValue::NULL, &JsValue::from_str(&json))
    {
        log(&format!("render callback failed: {e:?}"));
    }
}

fn apply_command(state: &SharedState, cmd: Option<ListenerCommand>) -> Result<(), JsValue> {
    match cmd {
        Some(ListenerCommand::Acquire) => {
            let listeners = attach_listeners(state)?;
            let previous = state.borrow_mut().listeners.replace(listeners);
            if let Some(old) = previous {
                old.release();
            }
        }
        Some(ListenerCommand::Release) => release_listeners(state),
        None => {}
    }
    Ok(())
}

fn release_listeners(state: &SharedState) {
    let listeners = state.borrow_mut().listeners.take();
    if let Some(l) = listeners {
        l.release();
    }
}

fn attach_listeners(state: &SharedState) -> Result<WindowListeners, JsValue> {
    let window = state.borrow().window.clone();

    let weak = Rc::downgrade(state);
    let on_move = move |e: Event| {
        if let Some(st) = weak.upgrade()
            && let Some((x, y)) = event_client_point(&e)
            && let Err(err) = dispatch(&st, DragEvent::Move { x, y })
        {
            log(&format!("drag move failed: {err:?}"));
        }
    };

    let weak = Rc::downgrade(state);
    let on_end = move |e: Event| {
        let Some(st) = weak.upgrade() else {
            return;
        };
        let target = event_client_point(&e).and_then(|(x, y)| {
            let document = st.borrow().document.clone();
            drop_target_at(&document, x, y)
        });
        if let Err(err) = dispatch(&st, DragEvent::End { target }) {
            log(&format!("drag end failed: {err:?}"));
        }
    };

    let weak = Rc::downgrade(state);
    let on_cancel = move |_e: Event| {
        if let Some(st) = weak.upgrade()
            && let Err(err) = dispatch(&st, DragEvent::Cancel)
        {
            log(&format!("drag cancel failed: {err:?}"));
        }
    };

    WindowListeners::attach(window.into(), on_move, on_end, on_cancel)
}
