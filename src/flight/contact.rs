//! Contact membership and per-segment contact history.
//!
//! Two separate pieces of state are kept:
//!
//! | State    | Keyed by     | Lifetime                                   |
//! |----------|--------------|--------------------------------------------|
//! | active   | `ContactId`  | begin → end of one physical touch          |
//! | history  | object name  | one flight segment (cleared on takeoff)    |
//!
//! Active membership uses the host's per-object id so that two distinct
//! scene objects sharing a name ("Rock") are counted separately.  History is
//! keyed by name because outcome rules are written in terms of names.

use bevy::prelude::*;
use std::collections::{BTreeMap, BTreeSet};

/// Host-assigned identity of a touched scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactId(pub u64);

/// One begin/stay callback from the host.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactEvent {
    pub other: ContactId,
    pub name: String,
    pub tag: String,
    /// Magnitude of the relative velocity at first touch.  Zero for stay events.
    pub relative_speed: f32,
}

impl ContactEvent {
    pub fn new(
        other: ContactId,
        name: impl Into<String>,
        tag: impl Into<String>,
        relative_speed: f32,
    ) -> Self {
        Self {
            other,
            name: name.into(),
            tag: tag.into(),
            relative_speed,
        }
    }
}

/// Tracks what the rocket touches now and what it touched this segment.
#[derive(Debug, Clone, Default)]
pub struct ContactLedger {
    takeoff_threshold: f32,
    active: BTreeSet<ContactId>,
    history: BTreeMap<String, String>,
}

impl ContactLedger {
    pub fn new(takeoff_threshold: f32) -> Self {
        Self {
            takeoff_threshold,
            ..default()
        }
    }

    /// Start of a touch.  Returns `true` when the name is new to this segment.
    pub fn on_contact_begin(&mut self, other: ContactId, name: &str, tag: &str) -> bool {
        self.active.insert(other);
        self.record(name, tag)
    }

    /// Continued touch.  Records the name if it slipped past `begin` (e.g. the
    /// touch started before the ledger was created); re-adds an id the host
    /// never announced so membership stays consistent with what is touching.
    pub fn on_contact_stay(&mut self, other: ContactId, name: &str, tag: &str) -> bool {
        self.active.insert(other);
        self.record(name, tag)
    }

    /// End of a touch.  Unknown ids are ignored.
    pub fn on_contact_end(&mut self, other: ContactId) {
        self.active.remove(&other);
    }

    /// Per-tick takeoff check.  Clears history, and returns `true`, only when
    /// nothing is touching, history is non-empty, and the rocket is moving
    /// faster than the takeoff threshold.
    pub fn on_tick(&mut self, current_speed: f32) -> bool {
        if self.active.is_empty()
            && !self.history.is_empty()
            && current_speed > self.takeoff_threshold
        {
            debug!(
                "[ledger] clearing {} historic contacts at {:.2} u/s",
                self.history.len(),
                current_speed
            );
            self.history.clear();
            return true;
        }
        false
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Snapshot copy of the segment history (name → tag).
    pub fn history(&self) -> BTreeMap<String, String> {
        self.history.clone()
    }

    /// Borrowed view of the history, for evaluation without copying.
    pub fn history_view(&self) -> &BTreeMap<String, String> {
        &self.history
    }

    pub fn tag_of(&self, name: &str) -> Option<&str> {
        self.history.get(name).map(String::as_str)
    }

    /// Forget everything, including active touches (level reload).
    pub fn reset(&mut self) {
        self.active.clear();
        self.history.clear();
    }

    fn record(&mut self, name: &str, tag: &str) -> bool {
        if self.history.contains_key(name) {
            return false;
        }
        self.history.insert(name.to_string(), tag.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger() -> ContactLedger {
        ContactLedger::new(1.0)
    }

    #[test]
    fn begin_is_idempotent_per_id() {
        let mut l = ledger();
        assert!(l.on_contact_begin(ContactId(1), "LandingPad", "Finish"));
        assert!(!l.on_contact_begin(ContactId(1), "LandingPad", "Finish"));
        assert_eq!(l.active_count(), 1);
        assert_eq!(l.history().len(), 1);
    }

    #[test]
    fn first_tag_wins_for_a_name() {
        let mut l = ledger();
        l.on_contact_begin(ContactId(1), "LandingPad", "Finish");
        l.on_contact_begin(ContactId(2), "LandingPad", "Untagged");
        assert_eq!(l.tag_of("LandingPad"), Some("Finish"));
        assert_eq!(l.active_count(), 2);
    }

    #[test]
    fn same_name_distinct_objects_tracked_separately() {
        let mut l = ledger();
        l.on_contact_begin(ContactId(1), "Rock", "Untagged");
        l.on_contact_begin(ContactId(2), "Rock", "Untagged");
        l.on_contact_end(ContactId(1));
        assert_eq!(l.active_count(), 1);
        assert!(!l.on_tick(5.0), "still touching the second rock");
    }

    #[test]
    fn history_survives_contact_end_until_takeoff() {
        let mut l = ledger();
        l.on_contact_begin(ContactId(1), "Rock", "Untagged");
        l.on_contact_end(ContactId(1));
        assert!(!l.on_tick(0.5), "too slow to count as takeoff");
        assert!(!l.on_tick(1.0), "threshold is exclusive");
        assert_eq!(l.history().len(), 1);
        assert!(l.on_tick(1.5));
        assert!(l.history().is_empty());
        assert!(!l.on_tick(1.5), "nothing left to clear");
    }

    #[test]
    fn never_clears_while_touching() {
        let mut l = ledger();
        l.on_contact_begin(ContactId(1), "LaunchingPad", "Untagged");
        for speed in [0.0, 2.0, 50.0] {
            assert!(!l.on_tick(speed));
        }
        assert_eq!(l.history().len(), 1);
    }

    #[test]
    fn stay_records_missed_begin() {
        let mut l = ledger();
        assert!(l.on_contact_stay(ContactId(4), "LaunchingPad", "Untagged"));
        assert_eq!(l.active_count(), 1);
        assert_eq!(l.tag_of("LaunchingPad"), Some("Untagged"));
    }

    #[test]
    fn end_of_unknown_id_is_ignored() {
        let mut l = ledger();
        l.on_contact_begin(ContactId(1), "Rock", "Untagged");
        l.on_contact_end(ContactId(99));
        assert_eq!(l.active_count(), 1);
    }

    #[test]
    fn clearing_matches_condition_for_every_interleaving() {
        // Walk well-paired begin/end orderings of two ids and check that clearing
        // happens exactly when nothing is active and speed exceeds takeoff.
        let ops: [(bool, u64); 4] = [(true, 1), (true, 2), (false, 1), (false, 2)];
        let orders: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [0, 1, 3, 2],
            [0, 2, 1, 3],
            [1, 0, 2, 3],
            [1, 0, 3, 2],
            [1, 3, 0, 2],
        ];
        for order in orders {
            let mut l = ledger();
            for idx in order {
                let (begin, id) = ops[idx];
                if begin {
                    l.on_contact_begin(ContactId(id), &format!("Obj{id}"), "Untagged");
                } else {
                    l.on_contact_end(ContactId(id));
                }
                let expect = l.active_count() == 0 && !l.history_view().is_empty();
                assert_eq!(l.on_tick(1.5), expect, "order {order:?}");
            }
        }
    }
}
