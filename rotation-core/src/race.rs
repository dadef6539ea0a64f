//! Race catalog entries and lookup.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::{Half, LifeStage};

pub type RaceId = u32;

/// Track surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Surface {
    Turf,
    Dirt,
}

impl Surface {
    pub const ALL: [Self; 2] = [Self::Turf, Self::Dirt];
}

impl std::fmt::Display for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Turf => write!(f, "turf"),
            Self::Dirt => write!(f, "dirt"),
        }
    }
}

/// Distance band, sprint (1) through long (4)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distance {
    Sprint,
    Mile,
    Medium,
    Long,
}

impl Distance {
    pub const ALL: [Self; 4] = [Self::Sprint, Self::Mile, Self::Medium, Self::Long];

    /// Map the numeric distance category (1..=4) used by catalog exports.
    #[must_use]
    pub const fn from_category(category: u8) -> Option<Self> {
        match category {
            1 => Some(Self::Sprint),
            2 => Some(Self::Mile),
            3 => Some(Self::Medium),
            4 => Some(Self::Long),
            _ => None,
        }
    }
}

impl std::fmt::Display for Distance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sprint => write!(f, "sprint"),
            Self::Mile => write!(f, "mile"),
            Self::Medium => write!(f, "medium"),
            Self::Long => write!(f, "long"),
        }
    }
}

/// Which life stages a race can be entered in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct StageEligibility {
    #[serde(default)]
    pub junior: bool,
    #[serde(default)]
    pub classic: bool,
    #[serde(default)]
    pub senior: bool,
}

impl StageEligibility {
    #[must_use]
    pub const fn allows(self, stage: LifeStage) -> bool {
        match stage {
            LifeStage::Junior => self.junior,
            LifeStage::Classic => self.classic,
            LifeStage::Senior => self.senior,
        }
    }
}

/// An immutable catalog entry for one major race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceRecord {
    pub id: RaceId,
    pub name: String,
    pub surface: Surface,
    pub distance: Distance,
    /// Rank tier: 1 = G1, 2 = G2, 3 = G3
    pub grade: u8,
    pub eligibility: StageEligibility,
    pub month: u8,
    pub half: Half,
    #[serde(default)]
    pub bc_final: bool,
    #[serde(default)]
    pub larc_exclusive: bool,
}

impl RaceRecord {
    pub fn stages(&self) -> impl Iterator<Item = LifeStage> + '_ {
        LifeStage::ALL
            .into_iter()
            .filter(|stage| self.eligibility.allows(*stage))
    }
}

/// The full set of races known to the planner, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "Vec<RaceRecord>", into = "Vec<RaceRecord>")]
pub struct RaceCatalog {
    races: Vec<RaceRecord>,
    by_id: BTreeMap<RaceId, usize>,
}

impl From<Vec<RaceRecord>> for RaceCatalog {
    fn from(races: Vec<RaceRecord>) -> Self {
        Self::new(races)
    }
}

impl From<RaceCatalog> for Vec<RaceRecord> {
    fn from(catalog: RaceCatalog) -> Self {
        catalog.races
    }
}

impl RaceCatalog {
    /// Build a catalog; a later record with a duplicate id shadows nothing and is ignored by lookup.
    #[must_use]
    pub fn new(races: Vec<RaceRecord>) -> Self {
        let mut by_id = BTreeMap::new();
        for (idx, race) in races.iter().enumerate() {
            by_id.entry(race.id).or_insert(idx);
        }
        Self { races, by_id }
    }

    #[must_use]
    pub fn get(&self, id: RaceId) -> Option<&RaceRecord> {
        self.by_id.get(&id).and_then(|idx| self.races.get(*idx))
    }

    #[must_use]
    pub fn by_name(&self, name: &str) -> Option<&RaceRecord> {
        self.races.iter().find(|race| race.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RaceRecord> {
        self.races.iter()
    }

    pub fn bc_finals(&self) -> impl DoubleEndedIterator<Item = &RaceRecord> {
        self.races.iter().filter(|race| race.bc_final)
    }

    #[must_use]
    pub fn has_duplicate_ids(&self) -> bool {
        self.by_id.len() != self.races.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.races.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }
}

impl<'a> IntoIterator for &'a RaceCatalog {
    type Item = &'a RaceRecord;
    type IntoIter = std::slice::Iter<'a, RaceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
