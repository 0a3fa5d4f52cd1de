//! Drag session lifecycle.
//!
//! Turns the host's pointer/touch signals into at most one active session and
//! hands completed drops to [`Exercise::apply_drop`]. The tracker also tells
//! the host when to install and remove its window-level move/up listeners:
//! every session that emits [`ListenerCommand::Acquire`] emits exactly one
//! [`ListenerCommand::Release`], whether it ends in a drop or a cancel.

use serde::Serialize;
use tracing::{debug, trace};

use crate::engine::{DropOutcome, Exercise, IgnoredDrop, Location, OptionId};

/// Position-free drag input, already normalised from pointer or touch events.
#[derive(Clone, Debug, PartialEq)]
pub enum DragEvent {
    Start { item: OptionId },
    Move { x: f64, y: f64 },
    /// `target` is the raw id of the element under the pointer, if any.
    End { target: Option<String> },
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DragSession {
    pub item: OptionId,
    pub origin: Location,
    pub pointer: Option<(f64, f64)>,
}

/// Host instruction for the window-level listener subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerCommand {
    Acquire,
    Release,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerIgnored {
    SessionActive,
    NoActiveSession,
    UnknownItem,
    Revealed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Started,
    Moved,
    Dropped(DropOutcome),
    Cancelled,
    Ignored(TrackerIgnored),
}

/// Outcome of one tracker dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub step: Step,
    pub command: Option<ListenerCommand>,
}

impl Dispatch {
    fn ignored(reason: TrackerIgnored) -> Self {
        Dispatch {
            step: Step::Ignored(reason),
            command: None,
        }
    }

    /// Whether the assignment state changed.
    pub fn changed_assignment(&self) -> bool {
        matches!(self.step, Step::Dropped(out) if out.changed())
    }
}

#[derive(Clone, Debug, Default)]
pub struct DragTracker {
    session: Option<DragSession>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn dispatch(&mut self, exercise: &mut Exercise, event: DragEvent) -> Dispatch {
        trace!(?event, active = self.session.is_some(), "drag event");
        match event {
            DragEvent::Start { item } => self.start(exercise, item),
            DragEvent::Move { x, y } => match self.session.as_mut() {
                Some(s) => {
                    s.pointer = Some((x, y));
                    Dispatch {
                        step: Step::Moved,
                        command: None,
                    }
                }
                None => Dispatch::ignored(TrackerIgnored::NoActiveSession),
            },
            DragEvent::End { target } => self.end(exercise, target.as_deref()),
            DragEvent::Cancel => match self.session.take() {
                Some(s) => {
                    debug!(item = s.item.0, "drag cancelled");
                    Dispatch {
                        step: Step::Cancelled,
                        command: Some(ListenerCommand::Release),
                    }
                }
                None => Dispatch::ignored(TrackerIgnored::NoActiveSession),
            },
        }
    }

    /// Drop any active session without touching the exercise, e.g. when the
    /// owning view is torn down.
    pub fn abort(&mut self) -> Option<ListenerCommand> {
        self.session.take().map(|_| ListenerCommand::Release)
    }

    fn start(&mut self, exercise: &Exercise, item: OptionId) -> Dispatch {
        if self.session.is_some() {
            return Dispatch::ignored(TrackerIgnored::SessionActive);
        }
        if exercise.is_revealed() {
            return Dispatch::ignored(TrackerIgnored::Revealed);
        }
        let Some(origin) = exercise.locate(item) else {
            return Dispatch::ignored(TrackerIgnored::UnknownItem);
        };
        debug!(item = item.0, ?origin, "drag started");
        self.session = Some(DragSession {
            item,
            origin,
            pointer: None,
        });
        Dispatch {
            step: Step::Started,
            command: Some(ListenerCommand::Acquire),
        }
    }

    fn end(&mut self, exercise: &mut Exercise, target: Option<&str>) -> Dispatch {
        let Some(session) = self.session.take() else {
            return Dispatch::ignored(TrackerIgnored::NoActiveSession);
        };
        let step = match target.and_then(|t| exercise.resolve_target(t)) {
            Some(target) => {
                let outcome = exercise.apply_drop(session.item, target);
                debug_assert_ne!(
                    outcome,
                    DropOutcome::Ignored(IgnoredDrop::UnknownItem),
                    "session item vanished from the exercise"
                );
                Step::Dropped(outcome)
            }
            None => {
                debug!(item = session.item.0, ?target, "drag ended off target");
                Step::Cancelled
            }
        };
        Dispatch {
            step,
            command: Some(ListenerCommand::Release),
        }
    }
}
