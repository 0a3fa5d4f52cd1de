//! Slot/option assignment engine for drag-and-drop fill-in-the-blank
//! exercises. Browser bindings live in `cloze-wasm`.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod feedback;
pub mod tracker;
pub mod view;

pub use config::{ExerciseConfig, Sentence};
pub use controller::ClozeController;
pub use engine::{
    DropOutcome, DropTarget, Exercise, IgnoredDrop, Location, OptionId, Phase, SlotId,
};
pub use error::{ConfigError, Result};
pub use feedback::{Feedback, SlotFeedback, slot_color};
pub use tracker::{
    Dispatch, DragEvent, DragSession, DragTracker, ListenerCommand, Step, TrackerIgnored,
};
pub use view::{DragPreview, ExerciseView, LineView, PoolEntry, Renderer};
