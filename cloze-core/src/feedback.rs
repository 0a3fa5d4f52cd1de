use serde::Serialize;

use crate::engine::{Exercise, SlotId};

/// Correctness of a single blank, derived from the live assignment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotFeedback {
    pub slot: SlotId,
    pub occupant: Option<String>,
    pub correct_answer: String,
    pub is_filled: bool,
    pub is_correct: bool,
    /// Text shown in the blank: the occupant while editing, the correct
    /// answer once revealed.
    pub displayed: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub slots: Vec<SlotFeedback>,
}

impl Feedback {
    pub fn filled_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_filled).count()
    }

    pub fn correct_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_correct).count()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_filled)
    }

    pub fn is_solved(&self) -> bool {
        self.slots.iter().all(|s| s.is_correct)
    }
}

impl Exercise {
    /// Project the current assignment into per-slot correctness. Never cached.
    pub fn feedback(&self) -> Feedback {
        let revealed = self.is_revealed();
        let slots = self
            .slot_ids()
            .map(|slot| {
                let occupant = self
                    .occupant(slot)
                    .and_then(|o| self.option_value(o))
                    .map(str::to_string);
                let correct_answer = self.correct_answer(slot).unwrap_or_default().to_string();
                let is_correct = occupant.as_deref() == Some(correct_answer.as_str());
                let displayed = if revealed {
                    Some(correct_answer.clone())
                } else {
                    occupant.clone()
                };
                SlotFeedback {
                    slot,
                    is_filled: occupant.is_some(),
                    is_correct,
                    occupant,
                    correct_answer,
                    displayed,
                }
            })
            .collect();
        Feedback { slots }
    }
}

/// Background colour for a blank. Filled blanks are highlighted while
/// editing; after reveal the colour reflects what the user actually placed.
pub fn slot_color(fb: &SlotFeedback, revealed: bool) -> &'static str {
    match (revealed, fb.is_filled, fb.is_correct) {
        (false, false, _) => "#fff",
        (false, true, _) => "yellow",
        (true, _, true) => "mediumseagreen",
        (true, _, false) => "tomato",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExerciseConfig, Sentence};
    use crate::engine::{DropTarget, OptionId};

    fn exercise() -> Exercise {
        Exercise::new(ExerciseConfig {
            sentences: vec![Sentence::new("x", "y"); 2],
            options: vec!["A".into(), "B".into(), "C".into()],
            correct_answers: vec!["A".into(), "B".into()],
        })
        .unwrap()
    }

    fn slot(n: usize) -> DropTarget {
        DropTarget::Slot(SlotId::new(n).unwrap())
    }

    #[test]
    fn empty_exercise_feedback() {
        let fb = exercise().feedback();
        assert_eq!(fb.slots.len(), 2);
        assert_eq!(fb.filled_count(), 0);
        assert!(!fb.is_complete());
        assert!(!fb.is_solved());
        assert!(fb.slots.iter().all(|s| s.displayed.is_none()));
        assert_eq!(slot_color(&fb.slots[0], false), "#fff");
    }

    #[test]
    fn tracks_filled_and_correct() {
        let mut ex = exercise();
        ex.apply_drop(OptionId(0), slot(1));
        ex.apply_drop(OptionId(2), slot(2));
        let fb = ex.feedback();
        assert!(fb.is_complete());
        assert_eq!(fb.correct_count(), 1);
        assert!(fb.slots[0].is_correct);
        assert!(!fb.slots[1].is_correct);
        assert_eq!(fb.slots[1].displayed.as_deref(), Some("C"));
        assert_eq!(slot_color(&fb.slots[1], false), "yellow");

        ex.apply_drop(OptionId(1), slot(2));
        assert!(ex.feedback().is_solved());
    }

    #[test]
    fn reveal_shows_answers_but_grades_placement() {
        let mut ex = exercise();
        ex.apply_drop(OptionId(1), slot(1));
        ex.reveal_answers();
        let fb = ex.feedback();
        assert_eq!(fb.slots[0].displayed.as_deref(), Some("A"));
        assert_eq!(fb.slots[0].occupant.as_deref(), Some("B"));
        assert!(!fb.slots[0].is_correct);
        assert_eq!(fb.slots[1].displayed.as_deref(), Some("B"));
        assert!(!fb.slots[1].is_filled);
        assert!(!fb.slots[1].is_correct);
        assert_eq!(slot_color(&fb.slots[0], true), "tomato");
    }
}
