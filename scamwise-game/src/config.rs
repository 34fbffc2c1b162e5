//! Session configuration and active-set selection.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_QUIZ_LENGTH;
use crate::data::{Difficulty, ScenarioData};

/// Quiz lengths offered by the configuration screen.
pub const QUIZ_LENGTHS: [usize; 4] = [5, 10, 15, 30];

/// Difficulty restriction applied when selecting the active scenario set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyFilter {
    #[default]
    All,
    Easy,
    Medium,
    Hard,
}

impl DifficultyFilter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Whether a scenario of the given difficulty passes this filter.
    #[must_use]
    pub const fn admits(self, difficulty: Difficulty) -> bool {
        match self {
            Self::All => true,
            Self::Easy => matches!(difficulty, Difficulty::Easy),
            Self::Medium => matches!(difficulty, Difficulty::Medium),
            Self::Hard => matches!(difficulty, Difficulty::Hard),
        }
    }
}

impl fmt::Display for DifficultyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

impl From<Difficulty> for DifficultyFilter {
    fn from(value: Difficulty) -> Self {
        match value {
            Difficulty::Easy => Self::Easy,
            Difficulty::Medium => Self::Medium,
            Difficulty::Hard => Self::Hard,
        }
    }
}

/// Player-selected training parameters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Upper bound on the number of scenarios in the active set.
    pub quiz_length: usize,
    pub difficulty: DifficultyFilter,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quiz_length: DEFAULT_QUIZ_LENGTH,
            difficulty: DifficultyFilter::All,
        }
    }
}

/// Select the active scenario set for one session as repository indices.
///
/// The repository is filtered by difficulty; when more scenarios pass the
/// filter than `quiz_length` allows, the candidates are shuffled (unbiased
/// Fisher-Yates) and truncated. A filtered set that fits is used whole, in
/// repository order, unshuffled. The returned order is fixed for the whole
/// session.
#[must_use]
pub fn select_active_set(
    repository: &ScenarioData,
    config: &SessionConfig,
    rng: &mut impl Rng,
) -> Vec<usize> {
    let mut candidates: Vec<usize> = repository
        .scenarios
        .iter()
        .enumerate()
        .filter(|(_, s)| config.difficulty.admits(s.difficulty))
        .map(|(index, _)| index)
        .collect();

    if candidates.len() > config.quiz_length {
        candidates.shuffle(rng);
        candidates.truncate(config.quiz_length);
    }
    candidates
}
