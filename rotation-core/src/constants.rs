//! Centralized tuning constants for rotation planning.
//!
//! These are the defaults the configuration layer falls back to. Game-balance
//! adjustments go through `PlannerConfig` overrides; the values here only move
//! through reviewed code changes.

use crate::aptitude::{AptitudeCategory, Grade};

// Calendar -----------------------------------------------------------------
pub const MONTHS_PER_STAGE: u8 = 12;
pub const SLOTS_PER_STAGE: usize = 24;
pub const CALENDAR_LEN: usize = SLOTS_PER_STAGE * 3;

// Catalog ------------------------------------------------------------------
pub const MAX_RACE_GRADE: u8 = 3;

// Aptitude -----------------------------------------------------------------
pub(crate) const DEFAULT_RUNNABLE_FLOOR: Grade = Grade::A;
pub(crate) const DEFAULT_MAX_CATEGORY_BOOST: u8 = 2;
pub(crate) const MAX_GRADE_STEPS: u8 = 7;

// Consecutive races --------------------------------------------------------
pub(crate) const DEFAULT_CONSECUTIVE_WINDOW: usize = 3;
pub(crate) const DEFAULT_CONSECUTIVE_MAX_RUN: usize = 3;

// Pair scoring -------------------------------------------------------------
pub(crate) const SCORE_THEMATIC_NATURAL: i32 = 10;
pub(crate) const SCORE_UNDECIDED_NATURAL: i32 = 5;
pub(crate) const SCORE_ADOPT_STRATEGY: i32 = 2;
pub(crate) const SCORE_ENHANCEMENT: i32 = 1;
pub(crate) const SCORE_PRESTIGE_BASE: i32 = 4;

// Secondary scenario -------------------------------------------------------
pub(crate) const SECONDARY_FLOOR_GRADE: Grade = Grade::A;
pub(crate) const SECONDARY_FLOOR_CATEGORIES: [AptitudeCategory; 2] =
    [AptitudeCategory::Turf, AptitudeCategory::Medium];

// Composition --------------------------------------------------------------
pub(crate) const STARS_PER_STEP: u8 = 3;
pub(crate) const STARS_PER_LINEAGE_SLOT: u16 = 3;
pub(crate) const MAX_LINEAGE_SLOTS: u16 = 6;
