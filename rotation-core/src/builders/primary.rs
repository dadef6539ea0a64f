//! Primary (BC) scenario builder: one grid per outstanding BC final.
use log::{debug, info, warn};

use crate::assign::GreedyAssigner;
use crate::calendar::{Scenario, Slot};
use crate::context::{PlanningContext, RacePool};
use crate::grid::GridPlan;
use crate::race::RaceRecord;

pub struct PrimaryBuilder<'c, 'a> {
    ctx: &'c PlanningContext<'a>,
}

impl<'c, 'a> PrimaryBuilder<'c, 'a> {
    #[must_use]
    pub const fn new(ctx: &'c PlanningContext<'a>) -> Self {
        Self { ctx }
    }

    /// Seed a grid for every outstanding BC final, then fill them greedily.
    #[must_use]
    pub fn build(&self, pool: &mut RacePool) -> Vec<GridPlan> {
        let finals: Vec<&RaceRecord> = self
            .ctx
            .catalog
            .bc_finals()
            .filter(|fin| !self.ctx.is_completed(fin.id))
            .collect();
        if finals.is_empty() {
            info!("primary: no outstanding finals");
            return Vec::new();
        }
        let plans = seed_plans(self.ctx, finals, pool);
        let plans = GreedyAssigner::new(self.ctx).run(plans, pool);
        info!(
            "primary: {} grids, {} races placed, {} left in pool",
            plans.len(),
            plans.iter().map(|p| p.grid.len()).sum::<usize>(),
            pool.len()
        );
        plans
    }
}

/// Init, mandatory placement and strategy projection for a set of finals.
///
/// Finals that need investment sort ahead of naturally runnable ones; the
/// sort is stable so catalog order breaks ties.
pub(crate) fn seed_plans(
    ctx: &PlanningContext<'_>,
    mut finals: Vec<&RaceRecord>,
    pool: &mut RacePool,
) -> Vec<GridPlan> {
    finals.sort_by_key(|fin| ctx.engine.natural_strategy(fin, ctx.profile).is_none());
    finals
        .into_iter()
        .map(|fin| {
            let plan = init_plan(ctx, fin, pool);
            let plan = place_mandatory(ctx, plan, fin, pool);
            project_strategy(ctx, plan, fin)
        })
        .collect()
}

fn init_plan(ctx: &PlanningContext<'_>, fin: &RaceRecord, pool: &mut RacePool) -> GridPlan {
    let mut plan = GridPlan::blank(Scenario::Bc, ctx.projected_state());
    plan.preplace(Slot::final_slot(fin), fin.id);
    plan.final_race = Some(fin.id);
    pool.consume(fin.id);
    plan
}

fn place_mandatory(
    ctx: &PlanningContext<'_>,
    mut plan: GridPlan,
    fin: &RaceRecord,
    pool: &mut RacePool,
) -> GridPlan {
    for entry in ctx.templates.mandatory_for(&fin.name) {
        let Some(race) = ctx.catalog.by_name(&entry.race) else {
            warn!(
                "template for {} names unknown race {}; skipped",
                fin.name, entry.race
            );
            continue;
        };
        if ctx.is_completed(race.id) || !pool.is_available(race.id) {
            continue;
        }
        if plan.preplace(entry.slot(), race.id) {
            pool.consume(race.id);
        } else {
            debug!(
                "{}: mandatory {} blocked at {}",
                fin.name,
                race.name,
                entry.slot()
            );
        }
    }
    plan
}

fn project_strategy(ctx: &PlanningContext<'_>, mut plan: GridPlan, fin: &RaceRecord) -> GridPlan {
    plan.strategy = ctx.engine.natural_strategy(fin, ctx.profile);
    plan.state = ctx.engine.state_for(ctx.profile, plan.strategy.as_ref());
    plan
}
