//! Bundled JSON dataset: characters, the race catalog, completion sets and
//! optional template overrides.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::RaceSource;
use crate::aptitude::{CharacterId, CharacterProfile};
use crate::constants::{MAX_RACE_GRADE, MONTHS_PER_STAGE};
use crate::planner::RaceSnapshot;
use crate::race::{RaceCatalog, RaceId};
use crate::templates::{TemplateBook, default_book};

const SAMPLE_DATA: &str = include_str!("../data/sample.json");

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset is not valid JSON")]
    Parse(#[from] serde_json::Error),
    #[error("race id {0} appears more than once in the catalog")]
    DuplicateRace(RaceId),
    #[error("character id {0} appears more than once")]
    DuplicateCharacter(CharacterId),
    #[error("race {race} has {field} {value}, expected 1..={max}")]
    InvalidRace {
        race: RaceId,
        field: &'static str,
        value: u8,
        max: u8,
    },
    #[error("completion set for character {character} names unknown race {race}")]
    UnknownCompletedRace { character: CharacterId, race: RaceId },
}

/// In-memory race source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Dataset {
    #[serde(default)]
    pub characters: Vec<CharacterProfile>,
    pub races: RaceCatalog,
    #[serde(default)]
    pub completed: BTreeMap<CharacterId, BTreeSet<RaceId>>,
    /// Overrides the embedded template book when present
    #[serde(default)]
    pub templates: Option<TemplateBook>,
}

impl Dataset {
    /// Parse and validate a dataset.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, ids repeat, or a completion
    /// set names a race missing from the catalog.
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let dataset: Self = serde_json::from_str(json)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// The sample dataset embedded in the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded data fails validation.
    pub fn load_from_static() -> Result<Self, DatasetError> {
        Self::from_json(SAMPLE_DATA)
    }

    fn validate(&self) -> Result<(), DatasetError> {
        let mut seen = BTreeSet::new();
        for race in &self.races {
            if !seen.insert(race.id) {
                return Err(DatasetError::DuplicateRace(race.id));
            }
            let bounds = [
                ("month", race.month, MONTHS_PER_STAGE),
                ("grade", race.grade, MAX_RACE_GRADE),
            ];
            if let Some((field, value, max)) = bounds
                .into_iter()
                .find(|(_, value, max)| !(1..=*max).contains(value))
            {
                return Err(DatasetError::InvalidRace {
                    race: race.id,
                    field,
                    value,
                    max,
                });
            }
        }
        let mut characters = BTreeSet::new();
        for profile in &self.characters {
            if !characters.insert(profile.id) {
                return Err(DatasetError::DuplicateCharacter(profile.id));
            }
        }
        for (character, races) in &self.completed {
            if let Some(race) = races.iter().find(|id| self.races.get(**id).is_none()) {
                return Err(DatasetError::UnknownCompletedRace {
                    character: *character,
                    race: *race,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn with_templates(mut self, templates: TemplateBook) -> Self {
        self.templates = Some(templates);
        self
    }

    #[must_use]
    pub fn character(&self, id: CharacterId) -> Option<&CharacterProfile> {
        self.characters.iter().find(|profile| profile.id == id)
    }

    /// Inputs for `id`, or `None` for an unregistered character.
    #[must_use]
    pub fn snapshot(&self, id: CharacterId) -> Option<RaceSnapshot> {
        let profile = self.character(id)?;
        Some(RaceSnapshot {
            profile: profile.clone(),
            catalog: self.races.clone(),
            completed: self.completed.get(&id).cloned().unwrap_or_default(),
        })
    }

    fn template_book(&self) -> &TemplateBook {
        self.templates.as_ref().unwrap_or_else(|| default_book())
    }
}

impl RaceSource for Dataset {
    type Error = DatasetError;

    fn fetch_outstanding_races(
        &self,
        character: CharacterId,
    ) -> Result<Option<RaceSnapshot>, Self::Error> {
        Ok(self.snapshot(character))
    }

    fn fetch_mandatory_templates(&self) -> Result<TemplateBook, Self::Error> {
        Ok(self.template_book().clone())
    }

    fn fetch_exclusive_names(&self) -> Result<BTreeSet<String>, Self::Error> {
        Ok(self.template_book().exclusive.clone())
    }
}
