//! Career calendar: slots, canonical ordering, scenario restrictions, and the
//! consecutive-race rule.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;

use crate::constants::{
    CALENDAR_LEN, DEFAULT_CONSECUTIVE_MAX_RUN, DEFAULT_CONSECUTIVE_WINDOW, MONTHS_PER_STAGE,
    SLOTS_PER_STAGE,
};
use crate::grid::PatternGrid;
use crate::race::{RaceCatalog, RaceRecord};

/// Career year
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifeStage {
    Junior,
    Classic,
    Senior,
}

impl LifeStage {
    pub const ALL: [Self; 3] = [Self::Junior, Self::Classic, Self::Senior];

    const fn index(self) -> usize {
        match self {
            Self::Junior => 0,
            Self::Classic => 1,
            Self::Senior => 2,
        }
    }

    /// Map the 1-based stage tier used by template exports.
    #[must_use]
    pub const fn from_tier(tier: u8) -> Option<Self> {
        match tier {
            1 => Some(Self::Junior),
            2 => Some(Self::Classic),
            3 => Some(Self::Senior),
            _ => None,
        }
    }
}

impl std::fmt::Display for LifeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Junior => write!(f, "junior"),
            Self::Classic => write!(f, "classic"),
            Self::Senior => write!(f, "senior"),
        }
    }
}

/// First or second half of a month
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Half {
    Front,
    Back,
}

impl Half {
    const fn index(self) -> usize {
        match self {
            Self::Front => 0,
            Self::Back => 1,
        }
    }
}

/// One placement opportunity in the career calendar.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub stage: LifeStage,
    pub month: u8,
    pub half: Half,
}

impl Slot {
    #[must_use]
    pub const fn new(stage: LifeStage, month: u8, half: Half) -> Self {
        Self { stage, month, half }
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.month >= 1 && self.month <= MONTHS_PER_STAGE
    }

    /// Chronological position in the canonical calendar (`0..CALENDAR_LEN`).
    #[must_use]
    pub fn ordinal(self) -> usize {
        let month = usize::from(self.month.clamp(1, MONTHS_PER_STAGE)) - 1;
        self.stage.index() * SLOTS_PER_STAGE + month * 2 + self.half.index()
    }

    #[must_use]
    pub fn from_ordinal(ordinal: usize) -> Option<Self> {
        if ordinal >= CALENDAR_LEN {
            return None;
        }
        let stage = LifeStage::ALL[ordinal / SLOTS_PER_STAGE];
        let within = ordinal % SLOTS_PER_STAGE;
        let month = u8::try_from(within / 2 + 1).ok()?;
        let half = if within % 2 == 0 { Half::Front } else { Half::Back };
        Some(Self::new(stage, month, half))
    }

    /// Slot of a scenario-final race: the senior year at the race's timing.
    #[must_use]
    pub const fn final_slot(race: &RaceRecord) -> Self {
        Self::new(LifeStage::Senior, race.month, race.half)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let half = match self.half {
            Half::Front => "early",
            Half::Back => "late",
        };
        write!(f, "{} {half} {:02}", self.stage, self.month)
    }
}

/// Every slot of the career in chronological order.
pub fn canonical_calendar() -> impl Iterator<Item = Slot> {
    (0..CALENDAR_LEN).filter_map(Slot::from_ordinal)
}

/// Every slot the race could occupy, one per eligible life stage.
#[must_use]
pub fn available_slots(race: &RaceRecord) -> SmallVec<[Slot; 3]> {
    race.stages()
        .map(|stage| Slot::new(stage, race.month, race.half))
        .filter(|slot| slot.is_valid())
        .collect()
}

/// Game mode with its own mandatory races and reserved slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Bc,
    Larc,
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bc => write!(f, "BC"),
            Self::Larc => write!(f, "L'Arc"),
        }
    }
}

/// Slots reserved for each scenario's mandatory and final placements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RestrictionTable {
    bc: BTreeSet<Slot>,
    larc: BTreeSet<Slot>,
}

impl RestrictionTable {
    /// BC reserves the final slot of every BC final in the catalog plus `bc_extra`.
    #[must_use]
    pub fn new(catalog: &RaceCatalog, bc_extra: &[Slot], larc: &[Slot]) -> Self {
        let bc = catalog
            .bc_finals()
            .map(Slot::final_slot)
            .chain(bc_extra.iter().copied())
            .collect();
        Self {
            bc,
            larc: larc.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn is_restricted(&self, scenario: Scenario, slot: Slot) -> bool {
        match scenario {
            Scenario::Bc => self.bc.contains(&slot),
            Scenario::Larc => self.larc.contains(&slot),
        }
    }

    /// The race's available slots minus the ones `scenario` reserves.
    #[must_use]
    pub fn open_slots(&self, scenario: Scenario, race: &RaceRecord) -> SmallVec<[Slot; 3]> {
        available_slots(race)
            .into_iter()
            .filter(|slot| !self.is_restricted(scenario, *slot))
            .collect()
    }
}

/// Bounds on back-to-back racing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsecutiveLimit {
    /// How far to look in each direction
    #[serde(default = "ConsecutiveLimit::default_window")]
    pub window: usize,
    /// Longest allowed chain of adjacent occupied slots
    #[serde(default = "ConsecutiveLimit::default_max_run")]
    pub max_run: usize,
}

impl Default for ConsecutiveLimit {
    fn default() -> Self {
        Self {
            window: Self::default_window(),
            max_run: Self::default_max_run(),
        }
    }
}

impl ConsecutiveLimit {
    const fn default_window() -> usize {
        DEFAULT_CONSECUTIVE_WINDOW
    }

    const fn default_max_run() -> usize {
        DEFAULT_CONSECUTIVE_MAX_RUN
    }

    /// Occupied slots chained directly before and after `slot` in `grid`.
    #[must_use]
    pub fn run_length(&self, grid: &PatternGrid, slot: Slot) -> usize {
        let ordinal = slot.ordinal();
        let before = (1..=self.window)
            .map_while(|step| ordinal.checked_sub(step))
            .filter_map(Slot::from_ordinal)
            .take_while(|probe| grid.is_occupied(*probe))
            .count();
        let after = (1..=self.window)
            .filter_map(|step| Slot::from_ordinal(ordinal + step))
            .take_while(|probe| grid.is_occupied(*probe))
            .count();
        before + after
    }

    #[must_use]
    pub fn violates(&self, grid: &PatternGrid, slot: Slot) -> bool {
        self.run_length(grid, slot) + 1 > self.max_run
    }
}
