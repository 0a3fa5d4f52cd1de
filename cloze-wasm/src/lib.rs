use std::cell::RefCell;
use std::rc::Rc;

use cloze_core::{ClozeController, DragEvent, ExerciseConfig, OptionId, Step};
use wasm_bindgen::prelude::*;

mod listeners;
mod logging;
mod state;
mod utils;

use crate::state::{QueuedRenderer, SharedState, WidgetState};
use crate::utils::{exercise_urls, fetch_text_with_fallbacks, get_query_param, log};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Drag-and-drop fill-in-the-blank widget.
///
/// The host renders the JSON view passed to `on_render`, marks each blank and
/// the option tray with `data-drop-target` set to the view's `targetId` /
/// `poolTargetId`, and calls `pointerDown` when an option is grabbed.
#[wasm_bindgen]
pub struct ClozeWidget {
    state: SharedState,
}

#[wasm_bindgen]
impl ClozeWidget {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, on_render: js_sys::Function) -> Result<ClozeWidget, JsValue> {
        logging::init();
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let config = ExerciseConfig::from_json(config_json).map_err(js_err)?;
        let controller = ClozeController::new(config, QueuedRenderer::default()).map_err(js_err)?;
        let state = Rc::new(RefCell::new(WidgetState {
            window,
            document,
            controller,
            listeners: None,
            on_render,
        }));
        state::flush(&state);
        Ok(ClozeWidget { state })
    }

    /// Fetch `exercise/<name>.json` and build a widget from it.
    pub async fn load(name: String, on_render: js_sys::Function) -> Result<ClozeWidget, JsValue> {
        let text = fetch_exercise(name).await?;
        ClozeWidget::new(&text, on_render)
    }

    /// Begin dragging option `option` (its index in the configured list)
    /// from client position `(x, y)`. Returns false if the drag was refused.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, option: usize, x: f64, y: f64) -> Result<bool, JsValue> {
        let started = state::dispatch(
            &self.state,
            DragEvent::Start {
                item: OptionId(option),
            },
        )?;
        if started.step != Step::Started {
            return Ok(false);
        }
        state::dispatch(&self.state, DragEvent::Move { x, y })?;
        Ok(true)
    }

    pub fn cancel(&self) -> Result<(), JsValue> {
        state::dispatch(&self.state, DragEvent::Cancel).map(|_| ())
    }

    #[wasm_bindgen(js_name = revealAnswers)]
    pub fn reveal_answers(&self) -> bool {
        let first = self.state.borrow_mut().controller.reveal_answers();
        state::flush(&self.state);
        first
    }

    #[wasm_bindgen(js_name = hasInteracted)]
    pub fn has_interacted(&self) -> bool {
        self.state.borrow().controller.exercise().has_interacted()
    }

    #[wasm_bindgen(js_name = viewJson)]
    pub fn view_json(&self) -> Result<String, JsValue> {
        self.state.borrow().controller.view().to_json().map_err(js_err)
    }
}

impl Drop for ClozeWidget {
    fn drop(&mut self) {
        state::teardown(&self.state);
    }
}

/// Exercise name from the page's `?exercise=` query parameter.
#[wasm_bindgen(js_name = exerciseNameFromLocation)]
pub fn exercise_name_from_location() -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    get_query_param(&search, "exercise")
}

/// Fetch `exercise/<name>.json` and return it once it validates.
#[wasm_bindgen(js_name = fetchExercise)]
pub async fn fetch_exercise(name: String) -> Result<String, JsValue> {
    logging::init();
    let window = web_sys::window().ok_or("no window")?;
    let fetched = fetch_text_with_fallbacks(&window, &exercise_urls(&name)).await;
    accept_exercise(&name, fetched).map_err(|e| {
        log(&e);
        JsValue::from_str(&e)
    })
}

/// Keep fetched exercise text only if it is present and validates.
fn accept_exercise(name: &str, fetched: Option<String>) -> Result<String, String> {
    let text = fetched.ok_or_else(|| format!("exercise '{name}' not found"))?;
    ExerciseConfig::from_json(&text).map_err(|e| format!("exercise '{name}' rejected: {e}"))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_exercise_text() {
        let text = r#"{"sentences":[{"textBefore":"x"}],"options":["a"],"correctAnswers":["a"]}"#;
        assert_eq!(accept_exercise("intro", Some(text.into())), Ok(text.to_string()));
    }

    #[test]
    fn rejects_missing_or_invalid_exercise() {
        assert_eq!(
            accept_exercise("intro", None),
            Err("exercise 'intro' not found".to_string())
        );
        let dup = r#"{"sentences":[{}],"options":["a","a"],"correctAnswers":["a"]}"#;
        let err = accept_exercise("dup", Some(dup.into())).unwrap_err();
        assert!(err.starts_with("exercise 'dup' rejected"), "{err}");
    }
}
