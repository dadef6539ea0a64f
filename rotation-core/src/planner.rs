//! Generation pipeline: primary, secondary and overflow builders feeding the
//! finalizer, threading one race pool through every phase.
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::aptitude::{CharacterId, CharacterProfile};
use crate::builders::{OverflowBuilder, PrimaryBuilder, SecondaryBuilder};
use crate::config::PlannerConfig;
use crate::context::{PlanningContext, RacePool};
use crate::finalize::{Finalizer, PatternResult};
use crate::race::{RaceCatalog, RaceId};
use crate::scoring::PairScorer;
use crate::templates::TemplateBook;

/// Immutable inputs for one character, as fetched from a race source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub profile: CharacterProfile,
    pub catalog: RaceCatalog,
    #[serde(default)]
    pub completed: BTreeSet<RaceId>,
}

impl RaceSnapshot {
    /// Outstanding races that builders draw from; BC finals are seeded
    /// separately and never enter the pool.
    #[must_use]
    pub fn race_pool(&self) -> RacePool {
        RacePool::new(
            self.catalog
                .iter()
                .filter(|race| !race.bc_final && !self.completed.contains(&race.id))
                .map(|race| race.id),
        )
    }
}

/// Patterns for one character plus informational echoes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub character_id: CharacterId,
    pub patterns: Vec<PatternResult>,
    /// Completion set as supplied, ascending
    pub completed: Vec<RaceId>,
    /// Outstanding races no builder could place, ascending
    pub unplaced: Vec<RaceId>,
}

/// Run every phase for `snapshot`. Deterministic for identical inputs.
#[must_use]
pub fn generate(
    snapshot: &RaceSnapshot,
    templates: &TemplateBook,
    config: &PlannerConfig,
    scorer: &dyn PairScorer,
) -> GenerationReport {
    let ctx = PlanningContext::new(
        &snapshot.catalog,
        &snapshot.profile,
        &snapshot.completed,
        templates,
        config,
        scorer,
    );
    let mut pool = snapshot.race_pool();
    info!(
        "generating patterns for {} ({} outstanding races)",
        snapshot.profile.name,
        pool.len()
    );

    let mut plans = PrimaryBuilder::new(&ctx).build(&mut pool);
    plans.extend(SecondaryBuilder::new(&ctx).build(&mut pool));
    plans.extend(OverflowBuilder::new(&ctx).build(&mut pool));

    let unplaced: Vec<RaceId> = pool.remaining().collect();
    if !unplaced.is_empty() {
        info!(
            "capacity: {} races could not be placed: {unplaced:?}",
            unplaced.len()
        );
    }

    GenerationReport {
        character_id: snapshot.profile.id,
        patterns: Finalizer::new(&ctx).finalize(plans),
        completed: snapshot.completed.iter().copied().collect(),
        unplaced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aptitude::{AptitudeGrades, Grade};
    use crate::calendar::{Half, Scenario};
    use crate::race::{Distance, RaceRecord, StageEligibility, Surface};
    use crate::scoring::WeightedScorer;

    fn race(id: RaceId, bc_final: bool) -> RaceRecord {
        RaceRecord {
            id,
            name: format!("Race {id}"),
            surface: Surface::Turf,
            distance: Distance::Medium,
            grade: 1,
            eligibility: StageEligibility {
                senior: true,
                ..StageEligibility::default()
            },
            month: if bc_final { 11 } else { 4 },
            half: Half::Front,
            bc_final,
            larc_exclusive: false,
        }
    }

    fn snapshot(completed: &[RaceId]) -> RaceSnapshot {
        RaceSnapshot {
            profile: CharacterProfile {
                id: 9,
                name: "Test".to_string(),
                aptitudes: AptitudeGrades::uniform(Grade::A),
            },
            catalog: RaceCatalog::new(vec![race(1, false), race(2, true)]),
            completed: completed.iter().copied().collect(),
        }
    }

    #[test]
    fn pool_excludes_finals_and_completed_races() {
        assert_eq!(snapshot(&[]).race_pool().remaining().collect::<Vec<_>>(), vec![1]);
        assert!(snapshot(&[1]).race_pool().is_empty());
    }

    #[test]
    fn everything_completed_yields_no_patterns() {
        let report = generate(
            &snapshot(&[2, 1]),
            &TemplateBook::default(),
            &PlannerConfig::default(),
            &WeightedScorer::default(),
        );
        assert_eq!(report.character_id, 9);
        assert!(report.patterns.is_empty());
        assert_eq!(report.completed, vec![1, 2]);
        assert!(report.unplaced.is_empty());
    }

    #[test]
    fn single_final_gets_one_primary_pattern() {
        let report = generate(
            &snapshot(&[]),
            &TemplateBook::default(),
            &PlannerConfig::default(),
            &WeightedScorer::default(),
        );
        assert_eq!(report.patterns.len(), 1);
        let pattern = &report.patterns[0];
        assert_eq!(pattern.scenario, Scenario::Bc);
        assert_eq!(pattern.total_races, 2);
        assert!(pattern.strategy.is_none());
        assert!(report.unplaced.is_empty());
    }
}
