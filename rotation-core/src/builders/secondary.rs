//! Secondary (L'Arc) scenario builder: a single grid under a fixed state.
use log::{debug, info, warn};

use crate::calendar::Scenario;
use crate::context::{PlanningContext, RacePool};
use crate::grid::GridPlan;
use crate::race::RaceRecord;

pub struct SecondaryBuilder<'c, 'a> {
    ctx: &'c PlanningContext<'a>,
}

impl<'c, 'a> SecondaryBuilder<'c, 'a> {
    #[must_use]
    pub const fn new(ctx: &'c PlanningContext<'a>) -> Self {
        Self { ctx }
    }

    /// Build the scenario grid, or `None` when no exclusive race is outstanding.
    ///
    /// The scenario does not support mid-rotation investment, so the grid's
    /// strategy stays `None` and races are accepted only if runnable under
    /// the floor-raised state.
    #[must_use]
    pub fn build(&self, pool: &mut RacePool) -> Option<GridPlan> {
        let ctx = self.ctx;
        let has_exclusive = ctx
            .catalog
            .iter()
            .any(|race| ctx.is_exclusive(race) && pool.is_available(race.id));
        if !has_exclusive {
            debug!("secondary: no exclusive races outstanding");
            return None;
        }

        let secondary = &ctx.config.secondary;
        let state = ctx
            .projected_state()
            .with_floor(&secondary.floor_categories, secondary.floor_grade);
        let mut plan = GridPlan::blank(Scenario::Larc, state);

        self.place_mandatory(&mut plan, pool);
        let leftovers: Vec<&RaceRecord> = ctx
            .catalog
            .iter()
            .filter(|race| !race.bc_final && pool.is_available(race.id))
            .collect();
        for race in leftovers {
            self.place_first_open(&mut plan, pool, race);
        }

        info!(
            "secondary: {} races placed, {} left in pool",
            plan.grid.len(),
            pool.len()
        );
        Some(plan)
    }

    fn place_mandatory(&self, plan: &mut GridPlan, pool: &mut RacePool) {
        let ctx = self.ctx;
        for entry in &ctx.templates.secondary {
            let Some(race) = ctx.catalog.by_name(&entry.race) else {
                warn!("secondary template names unknown race {}; skipped", entry.race);
                continue;
            };
            if pool.was_consumed(race.id) {
                continue;
            }
            if plan.preplace(entry.slot(), race.id) {
                pool.consume(race.id);
            }
        }
    }

    fn place_first_open(&self, plan: &mut GridPlan, pool: &mut RacePool, race: &RaceRecord) {
        let ctx = self.ctx;
        if !ctx.engine.is_runnable(race, &plan.state) {
            return;
        }
        let slot = ctx
            .restrictions
            .open_slots(Scenario::Larc, race)
            .into_iter()
            .find(|slot| !plan.grid.is_occupied(*slot) && !ctx.limit().violates(&plan.grid, *slot));
        if let Some(slot) = slot
            && plan.grid.place(slot, race.id)
        {
            pool.consume(race.id);
            debug!("secondary: {slot} takes {}", race.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aptitude::{AptitudeCategory, AptitudeGrades, CharacterProfile, Grade};
    use crate::calendar::{Half, LifeStage, Slot};
    use crate::config::PlannerConfig;
    use crate::race::{Distance, RaceCatalog, RaceId, StageEligibility, Surface};
    use crate::scoring::WeightedScorer;
    use crate::templates::{TemplateBook, TemplateEntry};
    use std::collections::BTreeSet;

    fn race(id: RaceId, name: &str, month: u8, half: Half, exclusive: bool) -> RaceRecord {
        RaceRecord {
            id,
            name: name.to_string(),
            surface: Surface::Turf,
            distance: Distance::Medium,
            grade: 2,
            eligibility: StageEligibility {
                classic: true,
                ..StageEligibility::default()
            },
            month,
            half,
            bc_final: false,
            larc_exclusive: exclusive,
        }
    }

    fn book() -> TemplateBook {
        TemplateBook {
            secondary: vec![
                TemplateEntry {
                    stage: LifeStage::Classic,
                    race: "Prix Niel".to_string(),
                    month: 9,
                    half: Half::Front,
                },
                TemplateEntry {
                    stage: LifeStage::Senior,
                    race: "Not In Catalog".to_string(),
                    month: 9,
                    half: Half::Front,
                },
            ],
            ..TemplateBook::default()
        }
    }

    /// Weak on turf and medium; the scenario floor lifts both to A.
    fn profile() -> CharacterProfile {
        CharacterProfile {
            id: 7,
            name: "Dirt Sprinter".to_string(),
            aptitudes: AptitudeGrades::uniform(Grade::A)
                .with(AptitudeCategory::Turf, Grade::C)
                .with(AptitudeCategory::Medium, Grade::D),
        }
    }

    fn build(catalog: &RaceCatalog, pool: &mut RacePool) -> Option<GridPlan> {
        let profile = profile();
        let completed = BTreeSet::new();
        let templates = book();
        let config = PlannerConfig::default();
        let scorer = WeightedScorer::default();
        let ctx = PlanningContext::new(
            catalog, &profile, &completed, &templates, &config, &scorer,
        );
        SecondaryBuilder::new(&ctx).build(pool)
    }

    #[test]
    fn no_grid_without_exclusive_races() {
        let catalog = RaceCatalog::new(vec![race(1, "Kikuka Sho", 10, Half::Back, false)]);
        let mut pool = RacePool::new([1]);
        assert!(build(&catalog, &mut pool).is_none());
        assert!(pool.is_available(1));
    }

    #[test]
    fn mandatory_then_first_open_slot() {
        let catalog = RaceCatalog::new(vec![
            race(1, "Prix Niel", 9, Half::Front, true),
            race(2, "Kobe Shimbun Hai", 9, Half::Back, false),
            race(3, "Kikuka Sho", 10, Half::Back, false),
        ]);
        let mut pool = RacePool::new([1, 2, 3]);
        let plan = build(&catalog, &mut pool).expect("secondary grid");

        assert_eq!(plan.scenario, Scenario::Larc);
        assert!(plan.strategy.is_none());
        assert_eq!(plan.state.grade(AptitudeCategory::Turf), Grade::A);
        assert_eq!(plan.state.grade(AptitudeCategory::Medium), Grade::A);
        assert_eq!(
            plan.grid.race_at(Slot::new(LifeStage::Classic, 9, Half::Front)),
            Some(1)
        );
        assert!(plan.preplaced.contains(&1));
        assert!(
            !plan.grid.contains_race(2),
            "classic September back is inside the restricted window"
        );
        assert_eq!(
            plan.grid.race_at(Slot::new(LifeStage::Classic, 10, Half::Back)),
            Some(3)
        );
        assert_eq!(pool.remaining().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn mandatory_consumed_by_primary_is_skipped() {
        let catalog = RaceCatalog::new(vec![
            race(1, "Prix Niel", 9, Half::Front, false),
            race(4, "Prix Foy", 9, Half::Front, true),
        ]);
        let mut pool = RacePool::new([1, 4]);
        pool.consume(1);
        let plan = build(&catalog, &mut pool).expect("secondary grid");
        assert!(!plan.grid.contains_race(1));
        assert!(plan.preplaced.is_empty());
    }
}
