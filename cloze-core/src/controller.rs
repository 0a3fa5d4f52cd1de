use crate::config::ExerciseConfig;
use crate::engine::Exercise;
use crate::error::Result;
use crate::tracker::{Dispatch, DragEvent, DragTracker, ListenerCommand, Step};
use crate::view::{ExerciseView, Renderer};

/// Wires drag input to the exercise and pushes views to the renderer.
pub struct ClozeController<R> {
    exercise: Exercise,
    tracker: DragTracker,
    renderer: R,
}

impl<R: Renderer> ClozeController<R> {
    pub fn new(config: ExerciseConfig, renderer: R) -> Result<Self> {
        let mut ctl = ClozeController {
            exercise: Exercise::new(config)?,
            tracker: DragTracker::new(),
            renderer,
        };
        ctl.render();
        Ok(ctl)
    }

    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }

    pub fn tracker(&self) -> &DragTracker {
        &self.tracker
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn view(&self) -> ExerciseView {
        ExerciseView::build(&self.exercise, &self.tracker)
    }

    /// Feed one drag event through the tracker; the view is refreshed
    /// before this returns unless the event was ignored.
    pub fn handle(&mut self, event: DragEvent) -> Dispatch {
        let dispatch = self.tracker.dispatch(&mut self.exercise, event);
        if !matches!(dispatch.step, Step::Ignored(_)) {
            self.render();
        }
        dispatch
    }

    pub fn reveal_answers(&mut self) -> bool {
        let first = self.exercise.reveal_answers();
        if first {
            self.render();
        }
        first
    }

    /// End any drag in progress without applying it.
    pub fn teardown(&mut self) -> Option<ListenerCommand> {
        let cmd = self.tracker.abort();
        if cmd.is_some() {
            self.render();
        }
        cmd
    }

    fn render(&mut self) {
        let view = ExerciseView::build(&self.exercise, &self.tracker);
        self.renderer.render(&view);
    }
}
