use serde::Serialize;

use crate::engine::{DropTarget, Exercise, OptionId};
use crate::feedback::slot_color;
use crate::tracker::DragTracker;

/// One sentence with its blank, ready to render.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub text_before: String,
    pub text_after: String,
    /// Value for the blank's `data-drop-target` attribute.
    pub target_id: String,
    /// Occupant handle, for starting a drag out of the blank.
    pub occupant: Option<OptionId>,
    pub displayed: Option<String>,
    pub color: &'static str,
    pub is_filled: bool,
    /// Only reported once answers are revealed.
    pub is_correct: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PoolEntry {
    pub id: OptionId,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DragPreview {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseView {
    pub lines: Vec<LineView>,
    pub pool: Vec<PoolEntry>,
    pub pool_target_id: String,
    pub pool_visible: bool,
    pub revealed: bool,
    pub interacted: bool,
    pub drag_preview: Option<DragPreview>,
}

impl ExerciseView {
    pub fn build(exercise: &Exercise, tracker: &DragTracker) -> ExerciseView {
        let revealed = exercise.is_revealed();
        let lines = exercise
            .sentences()
            .iter()
            .zip(exercise.feedback().slots)
            .map(|(sentence, fb)| LineView {
                text_before: sentence.text_before.clone(),
                text_after: sentence.text_after.clone(),
                target_id: DropTarget::Slot(fb.slot).dom_id(),
                occupant: exercise.occupant(fb.slot),
                color: slot_color(&fb, revealed),
                is_filled: fb.is_filled,
                is_correct: revealed.then_some(fb.is_correct),
                displayed: fb.displayed,
            })
            .collect();
        let pool = exercise
            .pool()
            .iter()
            .filter_map(|&id| {
                exercise.option_value(id).map(|t| PoolEntry {
                    id,
                    text: t.to_string(),
                })
            })
            .collect();
        let drag_preview = tracker.session().and_then(|s| {
            let (x, y) = s.pointer?;
            Some(DragPreview {
                text: exercise.option_value(s.item)?.to_string(),
                x,
                y,
            })
        });
        ExerciseView {
            lines,
            pool,
            pool_target_id: DropTarget::Pool.dom_id(),
            pool_visible: !revealed,
            revealed,
            interacted: exercise.has_interacted(),
            drag_preview,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Output side of the widget; receives a fresh view after every change.
pub trait Renderer {
    fn render(&mut self, view: &ExerciseView);
}

impl<F> Renderer for F
where
    F: FnMut(&ExerciseView),
{
    fn render(&mut self, view: &ExerciseView) {
        self(view)
    }
}
