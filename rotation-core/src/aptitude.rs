//! Aptitude grades, working state projection, and strategy (inherited
//! capability investment) math.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{DEFAULT_MAX_CATEGORY_BOOST, DEFAULT_RUNNABLE_FLOOR, MAX_GRADE_STEPS};
use crate::race::{Distance, RaceRecord, Surface};

pub type CharacterId = u32;

/// Ordinal aptitude rank, worst to best.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Grade {
    #[default]
    G,
    F,
    E,
    D,
    C,
    B,
    A,
    S,
}

impl Grade {
    const ORDER: [Self; 8] = [
        Self::G,
        Self::F,
        Self::E,
        Self::D,
        Self::C,
        Self::B,
        Self::A,
        Self::S,
    ];

    #[must_use]
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Raise by `steps`, saturating at `S`.
    #[must_use]
    pub fn raised(self, steps: u8) -> Self {
        let idx = usize::from(self.rank().saturating_add(steps).min(MAX_GRADE_STEPS));
        Self::ORDER[idx]
    }

    /// Steps needed to reach `target`; zero when already there.
    #[must_use]
    pub const fn steps_to(self, target: Self) -> u8 {
        target.rank().saturating_sub(self.rank())
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Closed set of aptitude categories: two surfaces, four distances, four running styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AptitudeCategory {
    Turf,
    Dirt,
    Sprint,
    Mile,
    Medium,
    Long,
    Runner,
    Leader,
    Betweener,
    Chaser,
}

pub const CATEGORY_COUNT: usize = 10;

impl AptitudeCategory {
    pub const ALL: [Self; CATEGORY_COUNT] = [
        Self::Turf,
        Self::Dirt,
        Self::Sprint,
        Self::Mile,
        Self::Medium,
        Self::Long,
        Self::Runner,
        Self::Leader,
        Self::Betweener,
        Self::Chaser,
    ];

    pub const STYLES: [Self; 4] = [Self::Runner, Self::Leader, Self::Betweener, Self::Chaser];

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn for_surface(surface: Surface) -> Self {
        match surface {
            Surface::Turf => Self::Turf,
            Surface::Dirt => Self::Dirt,
        }
    }

    #[must_use]
    pub const fn for_distance(distance: Distance) -> Self {
        match distance {
            Distance::Sprint => Self::Sprint,
            Distance::Mile => Self::Mile,
            Distance::Medium => Self::Medium,
            Distance::Long => Self::Long,
        }
    }
}

impl std::fmt::Display for AptitudeCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Turf => "turf",
            Self::Dirt => "dirt",
            Self::Sprint => "sprint",
            Self::Mile => "mile",
            Self::Medium => "medium",
            Self::Long => "long",
            Self::Runner => "runner",
            Self::Leader => "leader",
            Self::Betweener => "betweener",
            Self::Chaser => "chaser",
        };
        f.write_str(label)
    }
}

/// Named-field wire form of a grade table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
struct GradeSheet {
    #[serde(default)]
    turf: Grade,
    #[serde(default)]
    dirt: Grade,
    #[serde(default)]
    sprint: Grade,
    #[serde(default)]
    mile: Grade,
    #[serde(default)]
    medium: Grade,
    #[serde(default)]
    long: Grade,
    #[serde(default)]
    runner: Grade,
    #[serde(default)]
    leader: Grade,
    #[serde(default)]
    betweener: Grade,
    #[serde(default)]
    chaser: Grade,
}

/// One grade per aptitude category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "GradeSheet", into = "GradeSheet")]
pub struct AptitudeGrades([Grade; CATEGORY_COUNT]);

impl From<GradeSheet> for AptitudeGrades {
    fn from(s: GradeSheet) -> Self {
        Self([
            s.turf,
            s.dirt,
            s.sprint,
            s.mile,
            s.medium,
            s.long,
            s.runner,
            s.leader,
            s.betweener,
            s.chaser,
        ])
    }
}

impl From<AptitudeGrades> for GradeSheet {
    fn from(g: AptitudeGrades) -> Self {
        let [
            turf,
            dirt,
            sprint,
            mile,
            medium,
            long,
            runner,
            leader,
            betweener,
            chaser,
        ] = g.0;
        Self {
            turf,
            dirt,
            sprint,
            mile,
            medium,
            long,
            runner,
            leader,
            betweener,
            chaser,
        }
    }
}

impl AptitudeGrades {
    #[must_use]
    pub const fn uniform(grade: Grade) -> Self {
        Self([grade; CATEGORY_COUNT])
    }

    #[must_use]
    pub const fn get(&self, category: AptitudeCategory) -> Grade {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: AptitudeCategory, grade: Grade) {
        self.0[category.index()] = grade;
    }

    #[must_use]
    pub fn with(mut self, category: AptitudeCategory, grade: Grade) -> Self {
        self.set(category, grade);
        self
    }

    /// First category in `candidates` holding the highest grade.
    fn strongest(&self, candidates: &[AptitudeCategory]) -> Option<AptitudeCategory> {
        candidates.iter().copied().fold(None, |best, category| match best {
            Some(current) if self.get(current) >= self.get(category) => Some(current),
            _ => Some(category),
        })
    }
}

/// A character's innate aptitudes, immutable during generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterProfile {
    pub id: CharacterId,
    pub name: String,
    pub aptitudes: AptitudeGrades,
}

/// Effective grades for one grid; every change yields a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct AptitudeState {
    grades: AptitudeGrades,
}

impl AptitudeState {
    #[must_use]
    pub const fn grade(&self, category: AptitudeCategory) -> Grade {
        self.grades.get(category)
    }

    #[must_use]
    pub const fn grades(&self) -> &AptitudeGrades {
        &self.grades
    }

    /// Raise each listed category to at least `floor`.
    #[must_use]
    pub fn with_floor(mut self, categories: &[AptitudeCategory], floor: Grade) -> Self {
        for category in categories {
            let current = self.grades.get(*category);
            self.grades.set(*category, current.max(floor));
        }
        self
    }

    #[must_use]
    pub fn best_style(&self) -> AptitudeCategory {
        self.grades
            .strongest(&AptitudeCategory::STYLES)
            .unwrap_or(AptitudeCategory::Runner)
    }

    #[must_use]
    pub fn strongest_surface(&self) -> Surface {
        if self.grade(AptitudeCategory::Dirt) > self.grade(AptitudeCategory::Turf) {
            Surface::Dirt
        } else {
            Surface::Turf
        }
    }

    #[must_use]
    pub fn strongest_distance(&self) -> Distance {
        Distance::ALL
            .into_iter()
            .fold(None, |best: Option<Distance>, distance| match best {
                Some(current)
                    if self.grade(AptitudeCategory::for_distance(current))
                        >= self.grade(AptitudeCategory::for_distance(distance)) =>
                {
                    Some(current)
                }
                _ => Some(distance),
            })
            .unwrap_or(Distance::Medium)
    }
}

/// Per-category grade steps of inherited-capability investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(
    from = "BTreeMap<AptitudeCategory, u8>",
    into = "BTreeMap<AptitudeCategory, u8>"
)]
pub struct Strategy([u8; CATEGORY_COUNT]);

impl From<BTreeMap<AptitudeCategory, u8>> for Strategy {
    fn from(map: BTreeMap<AptitudeCategory, u8>) -> Self {
        let mut strategy = Self::default();
        for (category, steps) in map {
            strategy.set(category, steps);
        }
        strategy
    }
}

impl From<Strategy> for BTreeMap<AptitudeCategory, u8> {
    fn from(strategy: Strategy) -> Self {
        strategy.iter().collect()
    }
}

impl Strategy {
    #[must_use]
    pub const fn get(&self, category: AptitudeCategory) -> u8 {
        self.0[category.index()]
    }

    pub fn set(&mut self, category: AptitudeCategory, steps: u8) {
        self.0[category.index()] = steps;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|steps| *steps == 0)
    }

    /// Non-zero entries in category order.
    pub fn iter(&self) -> impl Iterator<Item = (AptitudeCategory, u8)> + '_ {
        AptitudeCategory::ALL
            .into_iter()
            .map(|category| (category, self.get(category)))
            .filter(|(_, steps)| *steps > 0)
    }

    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        let mut out = *self;
        for category in AptitudeCategory::ALL {
            out.set(
                category,
                self.get(category).saturating_add(other.get(category)),
            );
        }
        out
    }

    #[must_use]
    pub fn total_steps(&self) -> u16 {
        self.0.iter().map(|steps| u16::from(*steps)).sum()
    }
}

/// Thresholds the engine measures runnability and enhancement against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AptitudeConfig {
    #[serde(default = "AptitudeConfig::default_runnable_floor")]
    pub runnable_floor: Grade,
    /// Most strategy steps a single category may accumulate.
    #[serde(default = "AptitudeConfig::default_max_category_boost")]
    pub max_category_boost: u8,
}

impl Default for AptitudeConfig {
    fn default() -> Self {
        Self {
            runnable_floor: Self::default_runnable_floor(),
            max_category_boost: Self::default_max_category_boost(),
        }
    }
}

impl AptitudeConfig {
    const fn default_runnable_floor() -> Grade {
        DEFAULT_RUNNABLE_FLOOR
    }

    const fn default_max_category_boost() -> u8 {
        DEFAULT_MAX_CATEGORY_BOOST
    }
}

/// Pure functions over profiles, states and strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AptitudeEngine {
    cfg: AptitudeConfig,
}

impl AptitudeEngine {
    #[must_use]
    pub const fn new(cfg: AptitudeConfig) -> Self {
        Self { cfg }
    }

    #[must_use]
    pub const fn config(&self) -> &AptitudeConfig {
        &self.cfg
    }

    #[must_use]
    pub const fn project_state(&self, profile: &CharacterProfile) -> AptitudeState {
        AptitudeState {
            grades: profile.aptitudes,
        }
    }

    #[must_use]
    pub fn apply_strategy(&self, state: &AptitudeState, strategy: &Strategy) -> AptitudeState {
        let mut grades = state.grades;
        for (category, steps) in strategy.iter() {
            grades.set(category, grades.get(category).raised(steps));
        }
        AptitudeState { grades }
    }

    /// Projected profile with `strategy` (if any) applied.
    #[must_use]
    pub fn state_for(&self, profile: &CharacterProfile, strategy: Option<&Strategy>) -> AptitudeState {
        let base = self.project_state(profile);
        strategy.map_or(base, |s| self.apply_strategy(&base, s))
    }

    fn required_categories(race: &RaceRecord, state: &AptitudeState) -> [AptitudeCategory; 3] {
        [
            AptitudeCategory::for_surface(race.surface),
            AptitudeCategory::for_distance(race.distance),
            state.best_style(),
        ]
    }

    fn deficits(&self, race: &RaceRecord, state: &AptitudeState) -> Strategy {
        let mut needed = Strategy::default();
        for category in Self::required_categories(race, state) {
            needed.set(
                category,
                state.grade(category).steps_to(self.cfg.runnable_floor),
            );
        }
        needed
    }

    #[must_use]
    pub fn is_runnable(&self, race: &RaceRecord, state: &AptitudeState) -> bool {
        Self::required_categories(race, state)
            .into_iter()
            .all(|category| state.grade(category) >= self.cfg.runnable_floor)
    }

    /// Minimal investment making `final_race` runnable from the innate profile;
    /// `None` when natural aptitude suffices.
    #[must_use]
    pub fn natural_strategy(
        &self,
        final_race: &RaceRecord,
        profile: &CharacterProfile,
    ) -> Option<Strategy> {
        let needed = self.deficits(final_race, &self.project_state(profile));
        (!needed.is_empty()).then_some(needed)
    }

    /// Extra steps on top of `state`, or `None` when they would push a
    /// category they touch past the enhancement budget. Categories the race
    /// does not need are not checked against the budget.
    #[must_use]
    pub fn enhancement(
        &self,
        race: &RaceRecord,
        state: &AptitudeState,
        existing: Option<&Strategy>,
    ) -> Option<Strategy> {
        let needed = self.deficits(race, state);
        let within_budget = needed.iter().all(|(category, steps)| {
            let invested = existing.map_or(0, |s| s.get(category));
            invested.saturating_add(steps) <= self.cfg.max_category_boost
        });
        within_budget.then_some(needed)
    }

    /// Whether `race` fits the surface and distance the grid is built around.
    #[must_use]
    pub fn thematic_match(
        &self,
        race: &RaceRecord,
        state: &AptitudeState,
        reference_final: Option<&RaceRecord>,
    ) -> bool {
        match reference_final {
            Some(fin) => race.surface == fin.surface && race.distance == fin.distance,
            None => {
                race.surface == state.strongest_surface()
                    && race.distance == state.strongest_distance()
            }
        }
    }
}
