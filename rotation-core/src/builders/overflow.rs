//! Overflow builder: extra BC grids for races the first two passes left behind.
use log::{debug, info, warn};
use std::collections::BTreeMap;

use super::primary::seed_plans;
use crate::assign::GreedyAssigner;
use crate::calendar::{Scenario, Slot};
use crate::context::{PlanningContext, RacePool};
use crate::grid::GridPlan;
use crate::numbers::{ceil_f64_to_usize, usize_to_f64};
use crate::race::{RaceId, RaceRecord};

/// Slack subtracted before rounding slot pressure up, so `1/3 + 1/3 + 1/3`
/// never rounds to two grids.
const PRESSURE_EPSILON: f64 = 1e-9;

/// How many overflow grids a leftover pool needs, and why.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverflowSizing {
    /// Finals whose template names a leftover race, in template-book order
    pub seeded_finals: Vec<RaceId>,
    /// Peak per-slot contention, rounded up
    pub from_pressure: usize,
}

impl OverflowSizing {
    #[must_use]
    pub fn from_intermediate(&self) -> usize {
        self.seeded_finals.len()
    }

    #[must_use]
    pub fn grid_count(&self) -> usize {
        self.from_intermediate().max(self.from_pressure)
    }
}

pub struct OverflowBuilder<'c, 'a> {
    ctx: &'c PlanningContext<'a>,
}

impl<'c, 'a> OverflowBuilder<'c, 'a> {
    #[must_use]
    pub const fn new(ctx: &'c PlanningContext<'a>) -> Self {
        Self { ctx }
    }

    fn leftovers(&self, pool: &RacePool) -> Vec<&'a RaceRecord> {
        self.ctx
            .bc_candidates(pool)
            .filter(|race| !race.bc_final)
            .collect()
    }

    /// Size the overflow pass for the races still in `pool`.
    #[must_use]
    pub fn size(&self, pool: &RacePool) -> OverflowSizing {
        let ctx = self.ctx;
        let leftovers = self.leftovers(pool);
        if leftovers.is_empty() {
            return OverflowSizing::default();
        }

        let mut seeded_finals = Vec::new();
        for template in &ctx.templates.finals {
            let needed = template
                .mandatory
                .iter()
                .any(|entry| leftovers.iter().any(|race| race.name == entry.race));
            if !needed {
                continue;
            }
            match ctx.catalog.by_name(&template.final_name) {
                Some(fin) => seeded_finals.push(fin.id),
                None => warn!(
                    "template final {} is not in the catalog; skipped",
                    template.final_name
                ),
            }
        }

        let mut pressure: BTreeMap<Slot, f64> = BTreeMap::new();
        for race in &leftovers {
            let open = ctx.restrictions.open_slots(Scenario::Bc, race);
            if open.is_empty() {
                continue;
            }
            let share = 1.0 / usize_to_f64(open.len());
            for slot in open {
                *pressure.entry(slot).or_insert(0.0) += share;
            }
        }
        let peak = pressure.values().copied().fold(0.0_f64, f64::max);

        OverflowSizing {
            seeded_finals,
            from_pressure: ceil_f64_to_usize(peak - PRESSURE_EPSILON),
        }
    }

    /// Build the overflow grids; empty when nothing is left to place.
    #[must_use]
    pub fn build(&self, pool: &mut RacePool) -> Vec<GridPlan> {
        let ctx = self.ctx;
        let sizing = self.size(pool);
        let count = sizing.grid_count();
        if count == 0 {
            debug!("overflow: nothing left to place");
            return Vec::new();
        }

        let finals: Vec<&RaceRecord> = sizing
            .seeded_finals
            .iter()
            .filter_map(|id| ctx.catalog.get(*id))
            .collect();
        let mut plans = seed_plans(ctx, finals, pool);
        let blanks = count.saturating_sub(plans.len());
        plans.extend((0..blanks).map(|_| GridPlan::blank(Scenario::Bc, ctx.projected_state())));

        let mut plans = GreedyAssigner::new(ctx).run(plans, pool);
        for plan in &mut plans {
            self.assign_fallback_final(plan);
        }
        info!(
            "overflow: {} grids ({} seeded, pressure {}), {} left in pool",
            plans.len(),
            sizing.from_intermediate(),
            sizing.from_pressure,
            pool.len()
        );
        plans
    }

    /// Give a non-empty grid without a final the best-fitting runnable final.
    fn assign_fallback_final(&self, plan: &mut GridPlan) {
        if plan.final_race.is_some() || plan.grid.is_empty() {
            return;
        }
        let ctx = self.ctx;
        let placed: Vec<&RaceRecord> = plan
            .grid
            .iter()
            .filter_map(|(_, id)| ctx.catalog.get(id))
            .collect();
        // `max_by_key` keeps the last maximum; reversed, that is the first in catalog order.
        let best = ctx
            .catalog
            .bc_finals()
            .filter(|fin| {
                !plan.grid.is_occupied(Slot::final_slot(fin))
                    && ctx.engine.is_runnable(fin, &plan.state)
            })
            .map(|fin| {
                let fitness = placed
                    .iter()
                    .map(|race| {
                        usize::from(race.surface == fin.surface)
                            + usize::from(race.distance == fin.distance)
                    })
                    .sum::<usize>();
                (fin, fitness)
            })
            .rev()
            .max_by_key(|(_, fitness)| *fitness);
        if let Some((fin, _)) = best
            && plan.grid.place(Slot::final_slot(fin), fin.id)
        {
            plan.final_race = Some(fin.id);
            debug!("overflow: fallback final {}", fin.name);
        }
    }
}
