//! Heuristic scoring for (race, grid) pairs during greedy assignment.
use serde::{Deserialize, Serialize};

use crate::constants::{
    SCORE_ADOPT_STRATEGY, SCORE_ENHANCEMENT, SCORE_PRESTIGE_BASE, SCORE_THEMATIC_NATURAL,
    SCORE_UNDECIDED_NATURAL,
};
use crate::numbers::usize_to_i32;

/// Observations about one candidate pair that scorers read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairSignals {
    /// Runnable under the grid's current state with no further investment
    pub natural_runnable: bool,
    pub thematic: bool,
    pub strategy_undecided: bool,
    /// The race would need investment on top of the innate profile
    pub race_needs_strategy: bool,
    pub adopts_strategy: bool,
    pub enhanced: bool,
    /// Occupied slots chained around the candidate slot
    pub run_length: usize,
    /// Rank tier of the race, 1 = G1
    pub grade: u8,
}

pub trait PairScorer {
    fn score(&self, signals: &PairSignals) -> i32;
}

/// Weights for the default additive scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "ScoreWeights::default_thematic_natural")]
    pub thematic_natural: i32,
    #[serde(default = "ScoreWeights::default_undecided_natural")]
    pub undecided_natural: i32,
    #[serde(default = "ScoreWeights::default_adopt_strategy")]
    pub adopt_strategy: i32,
    #[serde(default = "ScoreWeights::default_enhancement")]
    pub enhancement: i32,
    /// Prestige bonus is `prestige_base - grade`
    #[serde(default = "ScoreWeights::default_prestige_base")]
    pub prestige_base: i32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            thematic_natural: Self::default_thematic_natural(),
            undecided_natural: Self::default_undecided_natural(),
            adopt_strategy: Self::default_adopt_strategy(),
            enhancement: Self::default_enhancement(),
            prestige_base: Self::default_prestige_base(),
        }
    }
}

impl ScoreWeights {
    const fn default_thematic_natural() -> i32 {
        SCORE_THEMATIC_NATURAL
    }

    const fn default_undecided_natural() -> i32 {
        SCORE_UNDECIDED_NATURAL
    }

    const fn default_adopt_strategy() -> i32 {
        SCORE_ADOPT_STRATEGY
    }

    const fn default_enhancement() -> i32 {
        SCORE_ENHANCEMENT
    }

    const fn default_prestige_base() -> i32 {
        SCORE_PRESTIGE_BASE
    }
}

/// Additive scorer: bonuses for natural thematic fits, undecided grids and
/// prestige, minus the clustering around the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WeightedScorer {
    weights: ScoreWeights,
}

impl WeightedScorer {
    #[must_use]
    pub const fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }
}

impl PairScorer for WeightedScorer {
    fn score(&self, s: &PairSignals) -> i32 {
        let w = &self.weights;
        let mut score = 0;
        if s.natural_runnable && s.thematic {
            score += w.thematic_natural;
        }
        if s.strategy_undecided && !s.race_needs_strategy {
            score += w.undecided_natural;
        }
        if s.strategy_undecided && s.adopts_strategy {
            score += w.adopt_strategy;
        }
        if s.enhanced {
            score += w.enhancement;
        }
        score -= usize_to_i32(s.run_length);
        score + w.prestige_base - i32::from(s.grade)
    }
}
