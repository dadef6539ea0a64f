//! Turn planning grids into reportable rotation patterns.
use serde::{Deserialize, Serialize};

use crate::aptitude::{AptitudeCategory, AptitudeState, Strategy};
use crate::calendar::{Half, LifeStage, Scenario, Slot};
use crate::constants::{MAX_LINEAGE_SLOTS, STARS_PER_LINEAGE_SLOT};
use crate::context::PlanningContext;
use crate::grid::GridPlan;
use crate::race::{Distance, RaceId, RaceRecord, Surface};

/// A race as it appears in a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedRace {
    pub month: u8,
    pub half: Half,
    pub id: RaceId,
    pub name: String,
    pub grade: u8,
    pub surface: Surface,
    pub distance: Distance,
}

impl PlacedRace {
    fn new(slot: Slot, race: &RaceRecord) -> Self {
        Self {
            month: slot.month,
            half: slot.half,
            id: race.id,
            name: race.name.clone(),
            grade: race.grade,
            surface: race.surface,
            distance: race.distance,
        }
    }
}

/// Most frequent surface and distance among a pattern's races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MainCondition {
    pub surface: Option<Surface>,
    pub distance: Option<Distance>,
}

impl MainCondition {
    fn from_races<'r>(races: impl IntoIterator<Item = &'r PlacedRace> + Clone) -> Self {
        Self {
            surface: most_frequent(&Surface::ALL, races.clone().into_iter().map(|r| r.surface)),
            distance: most_frequent(&Distance::ALL, races.into_iter().map(|r| r.distance)),
        }
    }
}

/// First value in `order` with the highest count; `None` for an empty input.
fn most_frequent<T: Copy + PartialEq>(order: &[T], values: impl Iterator<Item = T>) -> Option<T> {
    let values: Vec<T> = values.collect();
    order
        .iter()
        .map(|candidate| (*candidate, values.iter().filter(|v| *v == candidate).count()))
        .filter(|(_, count)| *count > 0)
        .rev()
        .max_by_key(|(_, count)| *count)
        .map(|(candidate, _)| candidate)
}

/// Stars of one capability to inherit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorTarget {
    pub category: AptitudeCategory,
    pub steps: u8,
    pub stars: u16,
}

/// Inheritance lineup recommended for a pattern's strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CapabilityComposition {
    pub factors: Vec<FactorTarget>,
    pub total_stars: u16,
    /// Parents and grandparents needed to carry `total_stars`
    pub lineage_slots: u16,
    /// Categories the scenario itself raises
    pub scenario_bonus: Vec<AptitudeCategory>,
}

/// A finished rotation pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternResult {
    pub scenario: Scenario,
    pub final_race: Option<PlacedRace>,
    pub strategy: Option<Strategy>,
    pub aptitude: AptitudeState,
    pub junior: Vec<PlacedRace>,
    pub classic: Vec<PlacedRace>,
    pub senior: Vec<PlacedRace>,
    pub main_condition: MainCondition,
    pub composition: CapabilityComposition,
    pub total_races: usize,
}

impl PatternResult {
    /// All races in chronological order.
    pub fn races(&self) -> impl Iterator<Item = &PlacedRace> {
        self.junior.iter().chain(&self.classic).chain(&self.senior)
    }
}

pub struct Finalizer<'c, 'a> {
    ctx: &'c PlanningContext<'a>,
}

impl<'c, 'a> Finalizer<'c, 'a> {
    #[must_use]
    pub const fn new(ctx: &'c PlanningContext<'a>) -> Self {
        Self { ctx }
    }

    /// Convert plans in order, dropping those with no races.
    #[must_use]
    pub fn finalize(&self, plans: impl IntoIterator<Item = GridPlan>) -> Vec<PatternResult> {
        plans
            .into_iter()
            .filter(|plan| !plan.grid.is_empty())
            .map(|plan| self.pattern(&plan))
            .collect()
    }

    fn pattern(&self, plan: &GridPlan) -> PatternResult {
        let catalog = self.ctx.catalog;
        let mut junior = Vec::new();
        let mut classic = Vec::new();
        let mut senior = Vec::new();
        let mut final_race = None;
        for (slot, id) in plan.grid.iter() {
            let Some(race) = catalog.get(id) else {
                continue;
            };
            let placed = PlacedRace::new(slot, race);
            if plan.final_race == Some(id) {
                final_race = Some(placed.clone());
            }
            match slot.stage {
                LifeStage::Junior => junior.push(placed),
                LifeStage::Classic => classic.push(placed),
                LifeStage::Senior => senior.push(placed),
            }
        }

        let main_condition = MainCondition::from_races(junior.iter().chain(&classic).chain(&senior));
        let total_races = junior.len() + classic.len() + senior.len();
        PatternResult {
            scenario: plan.scenario,
            final_race,
            strategy: plan.strategy,
            aptitude: plan.state,
            junior,
            classic,
            senior,
            main_condition,
            composition: self.composition(plan.scenario, plan.strategy.as_ref()),
            total_races,
        }
    }

    fn composition(&self, scenario: Scenario, strategy: Option<&Strategy>) -> CapabilityComposition {
        let scenario_bonus = match scenario {
            Scenario::Bc => Vec::new(),
            Scenario::Larc => self.ctx.config.secondary.floor_categories.clone(),
        };
        let stars_per_step = u16::from(self.ctx.config.composition.stars_per_step);
        let factors: Vec<FactorTarget> = strategy
            .into_iter()
            .flat_map(Strategy::iter)
            .filter(|(category, _)| !scenario_bonus.contains(category))
            .map(|(category, steps)| FactorTarget {
                category,
                steps,
                stars: u16::from(steps) * stars_per_step,
            })
            .collect();
        let total_stars = factors.iter().map(|f| f.stars).sum::<u16>();
        CapabilityComposition {
            factors,
            total_stars,
            lineage_slots: total_stars
                .div_ceil(STARS_PER_LINEAGE_SLOT)
                .min(MAX_LINEAGE_SLOTS),
            scenario_bonus,
        }
    }
}
