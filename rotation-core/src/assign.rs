//! Chronological greedy assignment of outstanding races to grids.
//!
//! Walks the canonical calendar once. At every slot each feasible
//! (race, grid) pair is scored, the best-scoring pairs are accepted first, and
//! a fallback pass fills whatever grids and races are still free so as few
//! races as possible are left behind.
use log::debug;
use std::collections::BTreeSet;

use crate::aptitude::Strategy;
use crate::calendar::{Slot, available_slots, canonical_calendar};
use crate::context::{PlanningContext, RacePool};
use crate::grid::GridPlan;
use crate::race::{RaceId, RaceRecord};
use crate::scoring::PairSignals;

/// How accepting a pair changes the grid's investment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Adjustment {
    Keep,
    /// Undecided grid takes on the race's strategy
    Adopt(Strategy),
    /// Extra steps merged into the grid's existing strategy
    Enhance(Strategy),
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    race: RaceId,
    grid: usize,
    score: i32,
    adjustment: Adjustment,
}

/// Per-slot bookkeeping: which grids and races already matched this round.
#[derive(Default)]
struct Round {
    grids: BTreeSet<usize>,
    races: BTreeSet<RaceId>,
}

impl Round {
    fn is_free(&self, candidate: &Candidate) -> bool {
        !self.grids.contains(&candidate.grid) && !self.races.contains(&candidate.race)
    }
}

pub struct GreedyAssigner<'c, 'a> {
    ctx: &'c PlanningContext<'a>,
}

impl<'c, 'a> GreedyAssigner<'c, 'a> {
    #[must_use]
    pub const fn new(ctx: &'c PlanningContext<'a>) -> Self {
        Self { ctx }
    }

    /// Assign races from `pool` into `plans`, returning the updated plans.
    #[must_use]
    pub fn run(&self, mut plans: Vec<GridPlan>, pool: &mut RacePool) -> Vec<GridPlan> {
        if plans.is_empty() {
            return plans;
        }
        for slot in canonical_calendar() {
            let races: Vec<&RaceRecord> = self
                .ctx
                .bc_candidates(pool)
                .filter(|race| available_slots(race).contains(&slot))
                .collect();
            if races.is_empty() {
                continue;
            }

            let mut candidates: Vec<Candidate> = races
                .iter()
                .flat_map(|race| {
                    plans
                        .iter()
                        .enumerate()
                        .filter_map(move |(idx, plan)| self.evaluate(race, idx, plan, slot))
                })
                .collect();
            candidates.sort_by(|a, b| b.score.cmp(&a.score));

            let mut round = Round::default();
            for candidate in candidates.iter().filter(|c| c.score > 0) {
                if round.is_free(candidate) {
                    self.accept(&mut plans, pool, &mut round, slot, candidate);
                }
            }
            for candidate in &candidates {
                if round.is_free(candidate) {
                    self.accept(&mut plans, pool, &mut round, slot, candidate);
                }
            }
        }
        plans
    }

    fn evaluate(
        &self,
        race: &RaceRecord,
        grid: usize,
        plan: &GridPlan,
        slot: Slot,
    ) -> Option<Candidate> {
        let ctx = self.ctx;
        if ctx.restrictions.is_restricted(plan.scenario, slot)
            || plan.grid.is_occupied(slot)
            || plan.grid.contains_race(race.id)
            || ctx.limit().violates(&plan.grid, slot)
        {
            return None;
        }

        let natural_runnable = ctx.engine.is_runnable(race, &plan.state);
        let undecided = plan.strategy_undecided();
        let adjustment = if natural_runnable {
            Adjustment::Keep
        } else if undecided {
            Adjustment::Adopt(ctx.engine.enhancement(race, &plan.state, None)?)
        } else {
            Adjustment::Enhance(ctx.engine.enhancement(
                race,
                &plan.state,
                plan.strategy.as_ref(),
            )?)
        };

        let reference = plan.final_race.and_then(|id| ctx.catalog.get(id));
        let signals = PairSignals {
            natural_runnable,
            thematic: ctx.engine.thematic_match(race, &plan.state, reference),
            strategy_undecided: undecided,
            race_needs_strategy: ctx.engine.natural_strategy(race, ctx.profile).is_some(),
            adopts_strategy: matches!(adjustment, Adjustment::Adopt(_)),
            enhanced: matches!(adjustment, Adjustment::Enhance(_)),
            run_length: ctx.limit().run_length(&plan.grid, slot),
            grade: race.grade,
        };
        Some(Candidate {
            race: race.id,
            grid,
            score: ctx.scorer.score(&signals),
            adjustment,
        })
    }

    fn accept(
        &self,
        plans: &mut [GridPlan],
        pool: &mut RacePool,
        round: &mut Round,
        slot: Slot,
        candidate: &Candidate,
    ) {
        let Some(plan) = plans.get_mut(candidate.grid) else {
            return;
        };
        if !plan.grid.place(slot, candidate.race) {
            return;
        }
        pool.consume(candidate.race);
        round.grids.insert(candidate.grid);
        round.races.insert(candidate.race);

        let engine = &self.ctx.engine;
        let profile = self.ctx.profile;
        match candidate.adjustment {
            Adjustment::Keep => {}
            Adjustment::Adopt(strategy) => {
                plan.state = engine.state_for(profile, Some(&strategy));
                plan.strategy = Some(strategy);
            }
            Adjustment::Enhance(extra) => {
                let merged = plan.strategy.unwrap_or_default().merged(&extra);
                plan.state = engine.state_for(profile, Some(&merged));
                plan.strategy = Some(merged);
            }
        }
        debug!(
            "{slot}: grid {} takes race {} (score {}, {:?})",
            candidate.grid, candidate.race, candidate.score, candidate.adjustment
        );
    }
}
