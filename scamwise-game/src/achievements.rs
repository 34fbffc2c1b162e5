//! Achievement catalog and evaluator.
//!
//! Rules are pure predicates over the progression ledger plus the scenario
//! repository; they run after every state-changing event. An unlocked id is
//! never re-evaluated or re-awarded.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{Category, ScenarioData};
use crate::ledger::ProgressionLedger;

/// Stable identifier for each achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstBlood,
    PerfectFive,
    Investigator,
    PhishingDestroyer,
    DefiExpert,
    Speedrun,
    FlawlessVictory,
}

impl AchievementId {
    pub const ALL: [Self; 7] = [
        Self::FirstBlood,
        Self::PerfectFive,
        Self::Investigator,
        Self::PhishingDestroyer,
        Self::DefiExpert,
        Self::Speedrun,
        Self::FlawlessVictory,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstBlood => "first_blood",
            Self::PerfectFive => "perfect_five",
            Self::Investigator => "investigator",
            Self::PhishingDestroyer => "phishing_destroyer",
            Self::DefiExpert => "defi_expert",
            Self::Speedrun => "speedrun",
            Self::FlawlessVictory => "flawless_victory",
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable display metadata and reward for one achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub xp_reward: u32,
}

/// Ordered achievement catalog. Evaluation order matches this list.
pub const CATALOG: [AchievementDef; 7] = [
    AchievementDef {
        id: AchievementId::FirstBlood,
        name: "First Blood",
        description: "Detect your first scam",
        icon: "🎯",
        xp_reward: 50,
    },
    AchievementDef {
        id: AchievementId::PerfectFive,
        name: "Perfect Five",
        description: "Get 5 scenarios correct in a row",
        icon: "🔥",
        xp_reward: 200,
    },
    AchievementDef {
        id: AchievementId::Investigator,
        name: "Investigator",
        description: "Use investigation tools 10 times",
        icon: "🔍",
        xp_reward: 100,
    },
    AchievementDef {
        id: AchievementId::PhishingDestroyer,
        name: "Phishing Destroyer",
        description: "Correctly identify 10 phishing attempts",
        icon: "🎣",
        xp_reward: 300,
    },
    AchievementDef {
        id: AchievementId::DefiExpert,
        name: "DeFi Expert",
        description: "Master all DeFi scam scenarios",
        icon: "💎",
        xp_reward: 500,
    },
    AchievementDef {
        id: AchievementId::Speedrun,
        name: "Speedrunner",
        description: "Complete a scenario in under 30 seconds",
        icon: "⚡",
        xp_reward: 150,
    },
    AchievementDef {
        id: AchievementId::FlawlessVictory,
        name: "Flawless Victory",
        description: "Complete all scenarios with 100% accuracy",
        icon: "👑",
        xp_reward: 1000,
    },
];

/// Look up the catalog entry for an id.
#[must_use]
pub fn definition(id: AchievementId) -> &'static AchievementDef {
    CATALOG
        .iter()
        .find(|def| def.id == id)
        .expect("catalog covers every id")
}

/// Completed scenarios (joined through the active set) carrying a category.
fn completed_in_category(
    ledger: &ProgressionLedger,
    repository: &ScenarioData,
    active: &[usize],
    category: Category,
) -> usize {
    ledger
        .completed
        .iter()
        .filter(|&&active_index| {
            active
                .get(active_index)
                .and_then(|&repo_index| repository.get(repo_index))
                .is_some_and(|s| s.category == category)
        })
        .count()
}

fn rule_met(
    id: AchievementId,
    ledger: &ProgressionLedger,
    repository: &ScenarioData,
    active: &[usize],
) -> bool {
    match id {
        AchievementId::FirstBlood => ledger.correct_answers >= 1,
        AchievementId::PerfectFive => ledger.streak >= 5,
        AchievementId::Investigator => ledger.tools_used >= 10,
        AchievementId::PhishingDestroyer => {
            ledger.correct_answers > 0
                && completed_in_category(ledger, repository, active, Category::Wallet) >= 10
        }
        AchievementId::DefiExpert => {
            let total = repository.count_in_category(Category::Defi);
            total > 0
                && completed_in_category(ledger, repository, active, Category::Defi) >= total
        }
        // Unlocked directly by the runner on a fast correct answer; the
        // catalog predicate never fires.
        AchievementId::Speedrun => false,
        // Compares against the full repository, not the active set, so it is
        // unreachable in shortened sessions.
        AchievementId::FlawlessVictory => {
            !repository.is_empty()
                && ledger.completed.len() == repository.len()
                && ledger.incorrect_answers == 0
        }
    }
}

/// Run the full ordered catalog, unlocking and awarding every not-yet-unlocked
/// achievement whose rule now holds. Returns the newly unlocked ids.
///
/// Calling again with unchanged ledger state returns an empty list.
pub fn evaluate(
    ledger: &mut ProgressionLedger,
    repository: &ScenarioData,
    active: &[usize],
) -> Vec<AchievementId> {
    let mut newly_unlocked = Vec::new();
    for def in &CATALOG {
        if ledger.is_unlocked(def.id) {
            continue;
        }
        if rule_met(def.id, ledger, repository, active) {
            ledger.unlock(def.id, def.xp_reward);
            newly_unlocked.push(def.id);
        }
    }
    newly_unlocked
}
