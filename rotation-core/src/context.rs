//! Read-only inputs shared by every builder, and the pool of races still up
//! for grabs.
use std::collections::BTreeSet;

use crate::aptitude::{AptitudeEngine, AptitudeState, CharacterProfile};
use crate::calendar::{ConsecutiveLimit, RestrictionTable};
use crate::config::PlannerConfig;
use crate::race::{RaceCatalog, RaceId, RaceRecord};
use crate::scoring::PairScorer;
use crate::templates::TemplateBook;

/// Everything a builder reads; nothing here changes during generation.
pub struct PlanningContext<'a> {
    pub catalog: &'a RaceCatalog,
    pub profile: &'a CharacterProfile,
    pub completed: &'a BTreeSet<RaceId>,
    pub templates: &'a TemplateBook,
    pub config: &'a PlannerConfig,
    pub scorer: &'a dyn PairScorer,
    pub engine: AptitudeEngine,
    pub restrictions: RestrictionTable,
}

impl<'a> PlanningContext<'a> {
    #[must_use]
    pub fn new(
        catalog: &'a RaceCatalog,
        profile: &'a CharacterProfile,
        completed: &'a BTreeSet<RaceId>,
        templates: &'a TemplateBook,
        config: &'a PlannerConfig,
        scorer: &'a dyn PairScorer,
    ) -> Self {
        let restrictions = RestrictionTable::new(
            catalog,
            &config.primary.extra_restricted,
            &config.secondary.restricted,
        );
        Self {
            catalog,
            profile,
            completed,
            templates,
            config,
            scorer,
            engine: AptitudeEngine::new(config.aptitude),
            restrictions,
        }
    }

    #[must_use]
    pub fn is_exclusive(&self, race: &RaceRecord) -> bool {
        race.larc_exclusive || self.templates.is_exclusive(&race.name)
    }

    #[must_use]
    pub fn is_completed(&self, race: RaceId) -> bool {
        self.completed.contains(&race)
    }

    #[must_use]
    pub const fn projected_state(&self) -> AptitudeState {
        self.engine.project_state(self.profile)
    }

    #[must_use]
    pub const fn limit(&self) -> &ConsecutiveLimit {
        &self.config.consecutive
    }

    /// Outstanding races that BC grids (primary and overflow) may draw on.
    pub fn bc_candidates<'p>(
        &'p self,
        pool: &'p RacePool,
    ) -> impl Iterator<Item = &'a RaceRecord> {
        self.catalog
            .iter()
            .filter(move |race| pool.is_available(race.id) && !self.is_exclusive(race))
    }
}

/// Outstanding races not yet consumed by any grid.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RacePool {
    remaining: BTreeSet<RaceId>,
    consumed: BTreeSet<RaceId>,
}

impl RacePool {
    #[must_use]
    pub fn new(races: impl IntoIterator<Item = RaceId>) -> Self {
        Self {
            remaining: races.into_iter().collect(),
            consumed: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn is_available(&self, race: RaceId) -> bool {
        self.remaining.contains(&race)
    }

    #[must_use]
    pub fn was_consumed(&self, race: RaceId) -> bool {
        self.consumed.contains(&race)
    }

    /// Mark `race` as taken. Returns `false` if it was not available.
    pub fn consume(&mut self, race: RaceId) -> bool {
        if self.remaining.remove(&race) {
            self.consumed.insert(race);
            true
        } else {
            false
        }
    }

    pub fn remaining(&self) -> impl Iterator<Item = RaceId> + '_ {
        self.remaining.iter().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}
