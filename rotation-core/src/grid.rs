//! Pattern grids and the per-grid planning record threaded through builders.
use std::collections::{BTreeMap, BTreeSet};

use crate::aptitude::{AptitudeState, Strategy};
use crate::calendar::{Scenario, Slot};
use crate::race::RaceId;

/// Slot -> race assignment; a slot holds at most one race and a race at most one slot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatternGrid {
    slots: BTreeMap<Slot, RaceId>,
    races: BTreeSet<RaceId>,
}

impl PatternGrid {
    /// Place `race` at `slot`. Returns `false` (and leaves the grid untouched)
    /// when either is already taken.
    pub fn place(&mut self, slot: Slot, race: RaceId) -> bool {
        if self.slots.contains_key(&slot) || self.races.contains(&race) {
            return false;
        }
        self.slots.insert(slot, race);
        self.races.insert(race);
        true
    }

    #[must_use]
    pub fn is_occupied(&self, slot: Slot) -> bool {
        self.slots.contains_key(&slot)
    }

    #[must_use]
    pub fn contains_race(&self, race: RaceId) -> bool {
        self.races.contains(&race)
    }

    #[must_use]
    pub fn race_at(&self, slot: Slot) -> Option<RaceId> {
        self.slots.get(&slot).copied()
    }

    /// Occupied slots in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, RaceId)> + '_ {
        self.slots.iter().map(|(slot, race)| (*slot, *race))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Everything one grid carries between phases: its assignments, investment
/// and the aptitude state that investment produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPlan {
    pub scenario: Scenario,
    pub grid: PatternGrid,
    pub strategy: Option<Strategy>,
    pub state: AptitudeState,
    pub final_race: Option<RaceId>,
    /// Mandatory and final placements; never revisited by later phases.
    pub preplaced: BTreeSet<RaceId>,
}

impl GridPlan {
    #[must_use]
    pub fn blank(scenario: Scenario, state: AptitudeState) -> Self {
        Self {
            scenario,
            grid: PatternGrid::default(),
            strategy: None,
            state,
            final_race: None,
            preplaced: BTreeSet::new(),
        }
    }

    /// Place a mandatory or final race; it is recorded as pre-placed.
    pub fn preplace(&mut self, slot: Slot, race: RaceId) -> bool {
        let placed = self.grid.place(slot, race);
        if placed {
            self.preplaced.insert(race);
        }
        placed
    }

    #[must_use]
    pub const fn strategy_undecided(&self) -> bool {
        self.strategy.is_none()
    }
}
