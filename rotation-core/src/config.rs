//! Planner configuration: thresholds, scoring weights and scenario rules.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aptitude::{AptitudeCategory, AptitudeConfig, Grade};
use crate::calendar::{ConsecutiveLimit, Half, LifeStage, Slot};
use crate::constants::{
    MAX_GRADE_STEPS, SECONDARY_FLOOR_CATEGORIES, SECONDARY_FLOOR_GRADE, STARS_PER_STEP,
};
use crate::scoring::ScoreWeights;

/// Errors raised when planner configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlannerConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: u32,
        max: u32,
        value: u32,
    },
    #[error("{field} lists an invalid slot ({slot:?})")]
    InvalidSlot { field: &'static str, slot: Slot },
}

/// Primary (BC) scenario rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PrimaryConfig {
    /// Reserved in addition to the final slots of every BC final
    #[serde(default)]
    pub extra_restricted: Vec<Slot>,
}

/// Secondary (L'Arc) scenario rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryConfig {
    #[serde(default = "SecondaryConfig::default_floor_categories")]
    pub floor_categories: Vec<AptitudeCategory>,
    #[serde(default = "SecondaryConfig::default_floor_grade")]
    pub floor_grade: Grade,
    #[serde(default = "SecondaryConfig::default_restricted")]
    pub restricted: Vec<Slot>,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            floor_categories: Self::default_floor_categories(),
            floor_grade: Self::default_floor_grade(),
            restricted: Self::default_restricted(),
        }
    }
}

impl SecondaryConfig {
    fn default_floor_categories() -> Vec<AptitudeCategory> {
        SECONDARY_FLOOR_CATEGORIES.to_vec()
    }

    const fn default_floor_grade() -> Grade {
        SECONDARY_FLOOR_GRADE
    }

    /// Overseas expedition window: late July through early October of the
    /// classic and senior years.
    fn default_restricted() -> Vec<Slot> {
        let window = [
            (7, Half::Back),
            (8, Half::Front),
            (8, Half::Back),
            (9, Half::Front),
            (9, Half::Back),
            (10, Half::Front),
        ];
        [LifeStage::Classic, LifeStage::Senior]
            .into_iter()
            .flat_map(|stage| {
                window
                    .iter()
                    .map(move |(month, half)| Slot::new(stage, *month, *half))
            })
            .collect()
    }
}

/// How strategies translate into inheritance recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionConfig {
    #[serde(default = "CompositionConfig::default_stars_per_step")]
    pub stars_per_step: u8,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            stars_per_step: Self::default_stars_per_step(),
        }
    }
}

impl CompositionConfig {
    const fn default_stars_per_step() -> u8 {
        STARS_PER_STEP
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlannerConfig {
    #[serde(default)]
    pub aptitude: AptitudeConfig,
    #[serde(default)]
    pub consecutive: ConsecutiveLimit,
    #[serde(default)]
    pub scoring: ScoreWeights,
    #[serde(default)]
    pub primary: PrimaryConfig,
    #[serde(default)]
    pub secondary: SecondaryConfig,
    #[serde(default)]
    pub composition: CompositionConfig,
}

impl PlannerConfig {
    /// Parse configuration overrides; omitted fields keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a planner config.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns an error when a threshold is out of range or a slot is malformed.
    pub fn validate(&self) -> Result<(), PlannerConfigError> {
        self.validate_consecutive()?;
        self.validate_aptitude()?;
        if self.composition.stars_per_step == 0 {
            return Err(PlannerConfigError::MinViolation {
                field: "composition.stars_per_step",
                min: 1,
                value: 0,
            });
        }
        Self::validate_slots("primary.extra_restricted", &self.primary.extra_restricted)?;
        Self::validate_slots("secondary.restricted", &self.secondary.restricted)?;
        Ok(())
    }

    fn validate_consecutive(&self) -> Result<(), PlannerConfigError> {
        let limit = &self.consecutive;
        if limit.window == 0 {
            return Err(PlannerConfigError::MinViolation {
                field: "consecutive.window",
                min: 1,
                value: 0,
            });
        }
        if limit.max_run == 0 {
            return Err(PlannerConfigError::MinViolation {
                field: "consecutive.max_run",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }

    fn validate_aptitude(&self) -> Result<(), PlannerConfigError> {
        let boost = self.aptitude.max_category_boost;
        if boost > MAX_GRADE_STEPS {
            return Err(PlannerConfigError::RangeViolation {
                field: "aptitude.max_category_boost",
                min: 0,
                max: u32::from(MAX_GRADE_STEPS),
                value: u32::from(boost),
            });
        }
        Ok(())
    }

    fn validate_slots(field: &'static str, slots: &[Slot]) -> Result<(), PlannerConfigError> {
        match slots.iter().find(|slot| !slot.is_valid()) {
            Some(slot) => Err(PlannerConfigError::InvalidSlot { field, slot: *slot }),
            None => Ok(()),
        }
    }
}
