use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{ExerciseConfig, Sentence};
use crate::error::Result;

/// Stable handle for one option, its position in the configured option list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionId(pub usize);

/// 1-based blank number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct SlotId(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZeroSlotId;

impl fmt::Display for ZeroSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("slot numbers start at 1")
    }
}

impl TryFrom<usize> for SlotId {
    type Error = ZeroSlotId;

    fn try_from(n: usize) -> std::result::Result<Self, Self::Error> {
        SlotId::new(n).ok_or(ZeroSlotId)
    }
}

impl From<SlotId> for usize {
    fn from(s: SlotId) -> usize {
        s.0
    }
}

impl SlotId {
    pub fn new(n: usize) -> Option<SlotId> {
        (n >= 1).then_some(SlotId(n))
    }

    pub fn from_index(i: usize) -> SlotId {
        SlotId(i + 1)
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn index(self) -> usize {
        self.0 - 1
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "blank{}", self.0)
    }
}

/// Where an option currently lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Pool,
    Slot(SlotId),
}

/// Resolved drop target of a completed drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropTarget {
    Pool,
    Slot(SlotId),
}

pub const POOL_TARGET_ID: &str = "pool";
const SLOT_TARGET_PREFIX: &str = "blank";

impl DropTarget {
    /// Parse a host-side target id. Only the exact spellings produced by
    /// [`DropTarget::dom_id`] are accepted; range checks against a concrete
    /// exercise happen in [`Exercise::resolve_target`].
    pub fn parse(id: &str) -> Option<DropTarget> {
        if id == POOL_TARGET_ID {
            return Some(DropTarget::Pool);
        }
        let digits = id.strip_prefix(SLOT_TARGET_PREFIX)?;
        if digits.starts_with('0') || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let n = digits.parse::<usize>().ok()?;
        SlotId::new(n).map(DropTarget::Slot)
    }

    pub fn dom_id(self) -> String {
        match self {
            DropTarget::Pool => POOL_TARGET_ID.to_string(),
            DropTarget::Slot(s) => s.to_string(),
        }
    }
}

impl From<Location> for DropTarget {
    fn from(loc: Location) -> Self {
        match loc {
            Location::Pool => DropTarget::Pool,
            Location::Slot(s) => DropTarget::Slot(s),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Editable,
    Revealed,
}

/// Why a drop was not applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoredDrop {
    Revealed,
    UnknownItem,
    UnknownSlot,
}

/// Result of one reconciliation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Item landed in an empty slot.
    Placed { from: Location, slot: SlotId },
    /// Item came from the pool; the slot's previous occupant went back to the pool.
    Replaced { slot: SlotId, displaced: OptionId },
    /// Slot-to-slot exchange.
    Swapped {
        from: SlotId,
        to: SlotId,
        displaced: OptionId,
    },
    /// Item left its slot for the pool.
    Returned { from: SlotId },
    Unchanged,
    Ignored(IgnoredDrop),
}

impl DropOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, DropOutcome::Unchanged | DropOutcome::Ignored(_))
    }
}

/// Assignment state of one fill-in-the-blank exercise.
///
/// The pool and the slots are the forward mapping; `locations` is the reverse
/// index and is rewritten in the same step as every forward mutation, so an
/// option is always found in exactly one place.
#[derive(Clone, Debug)]
pub struct Exercise {
    sentences: Vec<Sentence>,
    options: Vec<String>,
    correct_answers: Vec<String>,
    pool: Vec<OptionId>,
    slots: Vec<Option<OptionId>>,
    locations: Vec<Location>,
    phase: Phase,
    interacted: bool,
}

impl Exercise {
    pub fn new(config: ExerciseConfig) -> Result<Exercise> {
        config.validate()?;
        let ExerciseConfig {
            sentences,
            options,
            correct_answers,
        } = config;
        let pool = (0..options.len()).map(OptionId).collect();
        let locations = vec![Location::Pool; options.len()];
        let slots = vec![None; correct_answers.len()];
        debug!(
            options = options.len(),
            slots = correct_answers.len(),
            "exercise created"
        );
        Ok(Exercise {
            sentences,
            options,
            correct_answers,
            pool,
            slots,
            locations,
            phase: Phase::Editable,
            interacted: false,
        })
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn option_value(&self, id: OptionId) -> Option<&str> {
        self.options.get(id.0).map(String::as_str)
    }

    pub fn option_id(&self, value: &str) -> Option<OptionId> {
        self.options.iter().position(|o| o == value).map(OptionId)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> + use<> {
        (0..self.slots.len()).map(SlotId::from_index)
    }

    pub fn correct_answer(&self, slot: SlotId) -> Option<&str> {
        self.correct_answers.get(slot.index()).map(String::as_str)
    }

    pub fn pool(&self) -> &[OptionId] {
        &self.pool
    }

    pub fn slots(&self) -> &[Option<OptionId>] {
        &self.slots
    }

    pub fn occupant(&self, slot: SlotId) -> Option<OptionId> {
        self.slots.get(slot.index()).copied().flatten()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_revealed(&self) -> bool {
        self.phase == Phase::Revealed
    }

    /// True once any drag has completed on a known target.
    pub fn has_interacted(&self) -> bool {
        self.interacted
    }

    pub fn locate(&self, item: OptionId) -> Option<Location> {
        self.locations.get(item.0).copied()
    }

    /// Range-check a parsed target against this exercise.
    pub fn resolve_target(&self, id: &str) -> Option<DropTarget> {
        match DropTarget::parse(id)? {
            DropTarget::Slot(s) if s.index() >= self.slots.len() => None,
            t => Some(t),
        }
    }

    /// Reconcile one completed drag of `item` onto `target`.
    pub fn apply_drop(&mut self, item: OptionId, target: DropTarget) -> DropOutcome {
        if self.phase == Phase::Revealed {
            warn!(item = item.0, ?target, "drop after reveal ignored");
            return DropOutcome::Ignored(IgnoredDrop::Revealed);
        }
        let Some(origin) = self.locate(item) else {
            warn!(item = item.0, ?target, "drop of unknown option ignored");
            return DropOutcome::Ignored(IgnoredDrop::UnknownItem);
        };
        if let DropTarget::Slot(s) = target
            && s.index() >= self.slots.len()
        {
            warn!(item = item.0, slot = s.get(), "drop on unknown slot ignored");
            return DropOutcome::Ignored(IgnoredDrop::UnknownSlot);
        }
        self.interacted = true;

        let outcome = match (origin, target) {
            (Location::Pool, DropTarget::Pool) => DropOutcome::Unchanged,
            (Location::Slot(src), DropTarget::Pool) => {
                self.slots[src.index()] = None;
                self.push_pool(item);
                DropOutcome::Returned { from: src }
            }
            (Location::Slot(src), DropTarget::Slot(dst)) if src == dst => DropOutcome::Unchanged,
            (Location::Slot(src), DropTarget::Slot(dst)) => {
                let displaced = self.slots[dst.index()];
                self.set_slot(src, displaced);
                self.set_slot(dst, Some(item));
                match displaced {
                    Some(d) => DropOutcome::Swapped {
                        from: src,
                        to: dst,
                        displaced: d,
                    },
                    None => DropOutcome::Placed {
                        from: origin,
                        slot: dst,
                    },
                }
            }
            (Location::Pool, DropTarget::Slot(dst)) => {
                let displaced = self.slots[dst.index()];
                self.pool.retain(|&o| o != item);
                if let Some(d) = displaced {
                    self.push_pool(d);
                }
                self.set_slot(dst, Some(item));
                match displaced {
                    Some(d) => DropOutcome::Replaced {
                        slot: dst,
                        displaced: d,
                    },
                    None => DropOutcome::Placed {
                        from: origin,
                        slot: dst,
                    },
                }
            }
        };
        debug!(item = item.0, ?target, ?outcome, "drop reconciled");
        debug_assert!(self.check_invariant(), "assignment invariant broken");
        outcome
    }

    /// Enter answer mode. Returns false if already revealed.
    pub fn reveal_answers(&mut self) -> bool {
        if self.phase == Phase::Revealed {
            return false;
        }
        self.phase = Phase::Revealed;
        debug!("answers revealed");
        true
    }

    /// Every option sits in exactly one place and the reverse index agrees.
    pub fn check_invariant(&self) -> bool {
        let mut seen = vec![0usize; self.options.len()];
        for &o in &self.pool {
            let Some(n) = seen.get_mut(o.0) else {
                return false;
            };
            *n += 1;
            if self.locations[o.0] != Location::Pool {
                return false;
            }
        }
        for (i, occ) in self.slots.iter().enumerate() {
            if let Some(o) = occ {
                let Some(n) = seen.get_mut(o.0) else {
                    return false;
                };
                *n += 1;
                if self.locations[o.0] != Location::Slot(SlotId::from_index(i)) {
                    return false;
                }
            }
        }
        seen.iter().all(|&n| n == 1)
    }

    fn set_slot(&mut self, slot: SlotId, occupant: Option<OptionId>) {
        self.slots[slot.index()] = occupant;
        if let Some(o) = occupant {
            self.locations[o.0] = Location::Slot(slot);
        }
    }

    fn push_pool(&mut self, item: OptionId) {
        if !self.pool.contains(&item) {
            self.pool.push(item);
        }
        self.locations[item.0] = Location::Pool;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(options: &[&str], answers: &[&str]) -> Exercise {
        Exercise::new(ExerciseConfig {
            sentences: answers.iter().map(|_| Sentence::new("a", "b")).collect(),
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_answers: answers.iter().map(|s| s.to_string()).collect(),
        })
        .unwrap()
    }

    fn slot(n: usize) -> DropTarget {
        DropTarget::Slot(SlotId::new(n).unwrap())
    }

    fn s(n: usize) -> SlotId {
        SlotId::new(n).unwrap()
    }

    #[test]
    fn starts_with_everything_in_pool() {
        let ex = exercise(&["A", "B", "C"], &["A", "B"]);
        assert_eq!(ex.pool(), &[OptionId(0), OptionId(1), OptionId(2)]);
        assert_eq!(ex.slots(), &[None, None]);
        assert_eq!(ex.phase(), Phase::Editable);
        assert!(!ex.has_interacted());
        assert!(ex.check_invariant());
    }

    #[test]
    fn pool_to_empty_slot() {
        let mut ex = exercise(&["A", "B", "C"], &["A", "B"]);
        let out = ex.apply_drop(OptionId(0), slot(1));
        assert_eq!(
            out,
            DropOutcome::Placed {
                from: Location::Pool,
                slot: s(1)
            }
        );
        assert_eq!(ex.pool(), &[OptionId(1), OptionId(2)]);
        assert_eq!(ex.occupant(s(1)), Some(OptionId(0)));
        assert_eq!(ex.locate(OptionId(0)), Some(Location::Slot(s(1))));
        assert!(ex.has_interacted());
    }

    #[test]
    fn pool_to_occupied_slot_sends_occupant_to_pool_end() {
        let mut ex = exercise(&["A", "B", "C"], &["A", "B"]);
        ex.apply_drop(OptionId(0), slot(1));
        let out = ex.apply_drop(OptionId(2), slot(1));
        assert_eq!(
            out,
            DropOutcome::Replaced {
                slot: s(1),
                displaced: OptionId(0)
            }
        );
        assert_eq!(ex.pool(), &[OptionId(1), OptionId(0)]);
        assert_eq!(ex.occupant(s(1)), Some(OptionId(2)));
        assert_eq!(ex.locate(OptionId(0)), Some(Location::Pool));
    }

    #[test]
    fn slot_to_slot_swaps() {
        let mut ex = exercise(&["A", "B", "C"], &["A", "B"]);
        ex.apply_drop(OptionId(0), slot(1));
        ex.apply_drop(OptionId(1), slot(2));
        let out = ex.apply_drop(OptionId(1), slot(1));
        assert_eq!(
            out,
            DropOutcome::Swapped {
                from: s(2),
                to: s(1),
                displaced: OptionId(0)
            }
        );
        assert_eq!(ex.slots(), &[Some(OptionId(1)), Some(OptionId(0))]);
        assert_eq!(ex.pool(), &[OptionId(2)]);
        assert!(ex.check_invariant());
    }

    #[test]
    fn slot_to_empty_slot_moves() {
        let mut ex = exercise(&["A", "B"], &["A", "B"]);
        ex.apply_drop(OptionId(0), slot(1));
        let out = ex.apply_drop(OptionId(0), slot(2));
        assert_eq!(
            out,
            DropOutcome::Placed {
                from: Location::Slot(s(1)),
                slot: s(2)
            }
        );
        assert_eq!(ex.slots(), &[None, Some(OptionId(0))]);
    }

    #[test]
    fn own_slot_and_pool_to_pool_are_noops() {
        let mut ex = exercise(&["A", "B"], &["A", "B"]);
        assert_eq!(ex.apply_drop(OptionId(1), DropTarget::Pool), DropOutcome::Unchanged);
        assert_eq!(ex.pool(), &[OptionId(0), OptionId(1)]);
        ex.apply_drop(OptionId(0), slot(2));
        let before = ex.clone();
        assert_eq!(ex.apply_drop(OptionId(0), slot(2)), DropOutcome::Unchanged);
        assert_eq!(ex.slots(), before.slots());
        assert_eq!(ex.pool(), before.pool());
    }

    #[test]
    fn return_to_pool_clears_slot_and_appends() {
        let mut ex = exercise(&["A", "B", "C"], &["A"]);
        ex.apply_drop(OptionId(0), slot(1));
        let out = ex.apply_drop(OptionId(0), DropTarget::Pool);
        assert_eq!(out, DropOutcome::Returned { from: s(1) });
        assert_eq!(ex.slots(), &[None]);
        assert_eq!(ex.pool(), &[OptionId(1), OptionId(2), OptionId(0)]);
    }

    #[test]
    fn unknown_item_and_slot_are_ignored() {
        let mut ex = exercise(&["A"], &["A"]);
        assert_eq!(
            ex.apply_drop(OptionId(7), slot(1)),
            DropOutcome::Ignored(IgnoredDrop::UnknownItem)
        );
        assert_eq!(
            ex.apply_drop(OptionId(0), slot(2)),
            DropOutcome::Ignored(IgnoredDrop::UnknownSlot)
        );
        assert_eq!(ex.pool(), &[OptionId(0)]);
        assert!(!ex.has_interacted());
    }

    #[test]
    fn reveal_is_terminal_and_idempotent() {
        let mut ex = exercise(&["A", "B"], &["A"]);
        ex.apply_drop(OptionId(1), slot(1));
        assert!(ex.reveal_answers());
        assert!(!ex.reveal_answers());
        assert_eq!(
            ex.apply_drop(OptionId(0), slot(1)),
            DropOutcome::Ignored(IgnoredDrop::Revealed)
        );
        assert_eq!(ex.occupant(s(1)), Some(OptionId(1)));
        assert_eq!(ex.pool(), &[OptionId(0)]);
    }

    #[test]
    fn target_ids_parse_and_range_check() {
        let ex = exercise(&["A"], &["A", "B"]);
        assert_eq!(DropTarget::parse("pool"), Some(DropTarget::Pool));
        assert_eq!(DropTarget::parse("blank2"), Some(slot(2)));
        assert_eq!(DropTarget::parse("blank0"), None);
        assert_eq!(DropTarget::parse("blankx"), None);
        assert_eq!(DropTarget::parse("somewhere"), None);
        assert_eq!(DropTarget::parse("blank"), None);
        assert_eq!(DropTarget::parse("blank10"), Some(slot(10)));
        assert_eq!(ex.resolve_target("blank2"), Some(slot(2)));
        assert_eq!(ex.resolve_target("blank3"), None);
        assert_eq!(slot(2).dom_id(), "blank2");
        assert_eq!(DropTarget::Pool.dom_id(), "pool");
    }

    #[test]
    fn only_exact_target_spellings_resolve() {
        for id in ["blank+1", "blank01", " pool ", "pool\n", " blank1", "blank1 ", "Blank1"] {
            assert_eq!(DropTarget::parse(id), None, "{id:?}");
        }
        let ex = exercise(&["A"], &["A"]);
        assert_eq!(ex.resolve_target("blank01"), None);
    }

    #[test]
    fn zero_slot_is_rejected_on_deserialize() {
        assert!(serde_json::from_str::<DropTarget>(r#"{"slot":0}"#).is_err());
        assert!(serde_json::from_str::<Location>(r#"{"slot":0}"#).is_err());
        assert!(serde_json::from_str::<SlotId>("0").is_err());

        let mut ex = exercise(&["A"], &["A"]);
        let t: DropTarget = serde_json::from_str(r#"{"slot":1}"#).unwrap();
        assert_eq!(t, slot(1));
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"{"slot":1}"#);
        assert!(ex.apply_drop(OptionId(0), t).changed());

        let far: DropTarget = serde_json::from_str(r#"{"slot":5}"#).unwrap();
        assert_eq!(
            ex.apply_drop(OptionId(0), far),
            DropOutcome::Ignored(IgnoredDrop::UnknownSlot)
        );
    }

    #[test]
    fn value_lookup() {
        let ex = exercise(&["A", "B"], &["B"]);
        assert_eq!(ex.option_id("B"), Some(OptionId(1)));
        assert_eq!(ex.option_id("Z"), None);
        assert_eq!(ex.option_value(OptionId(0)), Some("A"));
        assert_eq!(ex.correct_answer(s(1)), Some("B"));
    }
}
