//! Race Rotation Planner
//!
//! Platform-agnostic core for generating race rotation patterns: given a
//! character's aptitudes and the races they still need, lay every outstanding
//! race onto a small set of career calendars, each built around a scenario
//! final. This crate has no I/O beyond the embedded sample data; callers plug
//! in a [`RaceSource`].

pub mod aptitude;
pub mod assign;
pub mod builders;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod context;
pub mod data;
pub mod finalize;
pub mod grid;
pub mod numbers;
pub mod planner;
pub mod race;
pub mod scoring;
pub mod templates;

use std::cell::OnceCell;
use std::collections::BTreeSet;
use thiserror::Error;

// Re-export commonly used types
pub use aptitude::{
    AptitudeCategory, AptitudeConfig, AptitudeEngine, AptitudeGrades, AptitudeState, CharacterId,
    CharacterProfile, Grade, Strategy,
};
pub use assign::GreedyAssigner;
pub use builders::{OverflowBuilder, OverflowSizing, PrimaryBuilder, SecondaryBuilder};
pub use calendar::{
    ConsecutiveLimit, Half, LifeStage, RestrictionTable, Scenario, Slot, available_slots,
    canonical_calendar,
};
pub use config::{
    CompositionConfig, PlannerConfig, PlannerConfigError, PrimaryConfig, SecondaryConfig,
};
pub use context::{PlanningContext, RacePool};
pub use data::{Dataset, DatasetError};
pub use finalize::{
    CapabilityComposition, FactorTarget, Finalizer, MainCondition, PatternResult, PlacedRace,
};
pub use grid::{GridPlan, PatternGrid};
pub use planner::{GenerationReport, RaceSnapshot, generate};
pub use race::{Distance, RaceCatalog, RaceId, RaceRecord, StageEligibility, Surface};
pub use scoring::{PairScorer, PairSignals, ScoreWeights, WeightedScorer};
pub use templates::{FinalTemplate, TemplateBook, TemplateEntry, default_book};

/// Trait for abstracting where profiles, races and templates come from
/// Platform-specific implementations should provide this
pub trait RaceSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Profile, catalog and completion set for `character`, or `None` when
    /// the character is not registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store cannot be read.
    fn fetch_outstanding_races(
        &self,
        character: CharacterId,
    ) -> Result<Option<RaceSnapshot>, Self::Error>;

    /// Mandatory race templates for every scenario final
    ///
    /// # Errors
    ///
    /// Returns an error if the templates cannot be loaded.
    fn fetch_mandatory_templates(&self) -> Result<TemplateBook, Self::Error>;

    /// Names of races only the secondary scenario may use
    ///
    /// # Errors
    ///
    /// Returns an error if the names cannot be loaded.
    fn fetch_exclusive_names(&self) -> Result<BTreeSet<String>, Self::Error>;
}

#[derive(Debug, Error)]
pub enum PlannerError<E: std::error::Error + 'static> {
    #[error("character {0} not found")]
    CharacterNotFound(CharacterId),
    #[error("race data source failed")]
    Source(#[source] E),
    #[error("invalid planner configuration: {0}")]
    InvalidConfig(#[from] PlannerConfigError),
}

/// Main planner for generating rotation patterns
pub struct RotationPlanner<S, P = WeightedScorer>
where
    S: RaceSource,
    P: PairScorer,
{
    source: S,
    scorer: P,
    config: PlannerConfig,
    templates: OnceCell<TemplateBook>,
}

impl<S> RotationPlanner<S>
where
    S: RaceSource,
{
    /// Create a planner with default configuration and scoring
    pub fn new(source: S) -> Self {
        Self::with_config(source, PlannerConfig::default())
    }

    /// Create a planner whose scorer uses the configured weights
    pub fn with_config(source: S, config: PlannerConfig) -> Self {
        let scorer = WeightedScorer::new(config.scoring);
        Self {
            source,
            scorer,
            config,
            templates: OnceCell::new(),
        }
    }
}

impl<S, P> RotationPlanner<S, P>
where
    S: RaceSource,
    P: PairScorer,
{
    /// Swap in a custom pair scorer
    pub fn with_scorer<Q: PairScorer>(self, scorer: Q) -> RotationPlanner<S, Q> {
        RotationPlanner {
            source: self.source,
            scorer,
            config: self.config,
            templates: self.templates,
        }
    }

    pub const fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Templates and exclusive names, fetched on first use.
    fn templates(&self) -> Result<&TemplateBook, S::Error> {
        if let Some(book) = self.templates.get() {
            return Ok(book);
        }
        let mut book = self.source.fetch_mandatory_templates()?;
        book.exclusive.extend(self.source.fetch_exclusive_names()?);
        Ok(self.templates.get_or_init(|| book))
    }

    /// Generate every rotation pattern for `character`
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the source fails, or
    /// the character is not registered.
    pub fn generate_patterns(
        &self,
        character: CharacterId,
    ) -> Result<GenerationReport, PlannerError<S::Error>> {
        self.config.validate()?;
        let snapshot = self
            .source
            .fetch_outstanding_races(character)
            .map_err(PlannerError::Source)?
            .ok_or(PlannerError::CharacterNotFound(character))?;
        let templates = self.templates().map_err(PlannerError::Source)?;
        Ok(generate(&snapshot, templates, &self.config, &self.scorer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;
    use std::fmt;

    fn race(id: RaceId, name: &str, month: u8, bc_final: bool) -> RaceRecord {
        RaceRecord {
            id,
            name: name.to_string(),
            surface: Surface::Turf,
            distance: Distance::Medium,
            grade: 1,
            eligibility: StageEligibility {
                senior: true,
                ..StageEligibility::default()
            },
            month,
            half: Half::Front,
            bc_final,
            larc_exclusive: false,
        }
    }

    #[derive(Default)]
    struct FixtureSource {
        template_loads: Cell<u32>,
    }

    impl RaceSource for FixtureSource {
        type Error = Infallible;

        fn fetch_outstanding_races(
            &self,
            character: CharacterId,
        ) -> Result<Option<RaceSnapshot>, Self::Error> {
            if character != 1 {
                return Ok(None);
            }
            Ok(Some(RaceSnapshot {
                profile: CharacterProfile {
                    id: 1,
                    name: "Fixture".to_string(),
                    aptitudes: AptitudeGrades::uniform(Grade::A),
                },
                catalog: RaceCatalog::new(vec![
                    race(1, "BC Turf", 11, true),
                    race(2, "Osaka Hai", 3, false),
                    race(3, "Grand Prix de Saint-Cloud", 7, false),
                ]),
                completed: BTreeSet::new(),
            }))
        }

        fn fetch_mandatory_templates(&self) -> Result<TemplateBook, Self::Error> {
            self.template_loads.set(self.template_loads.get() + 1);
            Ok(TemplateBook::default())
        }

        fn fetch_exclusive_names(&self) -> Result<BTreeSet<String>, Self::Error> {
            Ok(BTreeSet::from(["Grand Prix de Saint-Cloud".to_string()]))
        }
    }

    #[derive(Debug)]
    struct Offline;

    impl fmt::Display for Offline {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("offline")
        }
    }

    impl std::error::Error for Offline {}

    struct FailingSource;

    impl RaceSource for FailingSource {
        type Error = Offline;

        fn fetch_outstanding_races(
            &self,
            _character: CharacterId,
        ) -> Result<Option<RaceSnapshot>, Self::Error> {
            Err(Offline)
        }

        fn fetch_mandatory_templates(&self) -> Result<TemplateBook, Self::Error> {
            Err(Offline)
        }

        fn fetch_exclusive_names(&self) -> Result<BTreeSet<String>, Self::Error> {
            Err(Offline)
        }
    }

    struct FlatScorer;

    impl PairScorer for FlatScorer {
        fn score(&self, _signals: &PairSignals) -> i32 {
            1
        }
    }

    #[test]
    fn planner_merges_exclusive_names_and_caches_templates() {
        let planner = RotationPlanner::new(FixtureSource::default());
        let report = planner.generate_patterns(1).unwrap();
        assert_eq!(report.patterns.len(), 2, "primary plus secondary");
        assert_eq!(report.patterns[0].scenario, Scenario::Bc);
        assert_eq!(report.patterns[1].scenario, Scenario::Larc);
        assert!(
            report.patterns[0].races().all(|r| r.id != 3),
            "exclusive race stays out of BC grids"
        );

        planner.generate_patterns(1).unwrap();
        assert_eq!(planner.source().template_loads.get(), 1);
    }

    #[test]
    fn unknown_character_is_an_error() {
        let planner = RotationPlanner::new(FixtureSource::default());
        let err = planner.generate_patterns(42).unwrap_err();
        assert!(matches!(err, PlannerError::CharacterNotFound(42)));
        assert_eq!(err.to_string(), "character 42 not found");
    }

    #[test]
    fn source_failures_propagate() {
        let planner = RotationPlanner::new(FailingSource);
        let err = planner.generate_patterns(1).unwrap_err();
        assert!(matches!(err, PlannerError::Source(Offline)));
        assert_eq!(
            std::error::Error::source(&err).map(ToString::to_string),
            Some("offline".to_string())
        );
    }

    #[test]
    fn invalid_config_is_refused_before_fetching() {
        let mut config = PlannerConfig::default();
        config.consecutive.window = 0;
        let planner = RotationPlanner::with_config(FixtureSource::default(), config);
        let err = planner.generate_patterns(1).unwrap_err();
        assert!(matches!(err, PlannerError::InvalidConfig(_)));
        assert_eq!(planner.source().template_loads.get(), 0);
    }

    #[test]
    fn custom_scorer_still_places_every_race() {
        let planner = RotationPlanner::new(FixtureSource::default()).with_scorer(FlatScorer);
        let report = planner.generate_patterns(1).unwrap();
        assert!(report.unplaced.is_empty());
    }
}
