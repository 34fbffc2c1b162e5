//! Mutable per-session progression record: XP, level, streak, skill tracks,
//! answer tallies, and unlocked achievements.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::achievements::AchievementId;
use crate::constants::{LEVEL_XP_STEP, SKILL_BASE_THRESHOLD};

/// Proficiency track credited by correct answers and tool use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillId {
    PhishingDetection,
    ContractAnalysis,
    SocialEngineering,
    TechnicalAuditing,
}

impl SkillId {
    pub const ALL: [Self; 4] = [
        Self::PhishingDetection,
        Self::ContractAnalysis,
        Self::SocialEngineering,
        Self::TechnicalAuditing,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PhishingDetection => "phishing_detection",
            Self::ContractAnalysis => "contract_analysis",
            Self::SocialEngineering => "social_engineering",
            Self::TechnicalAuditing => "technical_auditing",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::PhishingDetection => "Phishing Detection",
            Self::ContractAnalysis => "Contract Analysis",
            Self::SocialEngineering => "Social Engineering",
            Self::TechnicalAuditing => "Technical Auditing",
        }
    }
}

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Level and XP state for a single skill track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillTrack {
    pub level: u32,
    pub xp: u32,
    /// XP required to reach the next level. Grows by half on every level-up.
    pub next_level_xp: u32,
}

impl Default for SkillTrack {
    fn default() -> Self {
        Self {
            level: 1,
            xp: 0,
            next_level_xp: SKILL_BASE_THRESHOLD,
        }
    }
}

impl SkillTrack {
    /// Progress toward the next level as a ratio in `[0, 1)`.
    #[must_use]
    pub fn progress_ratio(&self) -> f32 {
        if self.next_level_xp == 0 {
            return 0.0;
        }
        self.xp as f32 / self.next_level_xp as f32
    }
}

/// The four skill tracks, stored as named fields so access stays
/// match-checked rather than string-keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SkillSet {
    pub phishing_detection: SkillTrack,
    pub contract_analysis: SkillTrack,
    pub social_engineering: SkillTrack,
    pub technical_auditing: SkillTrack,
}

impl SkillSet {
    #[must_use]
    pub const fn track(&self, id: SkillId) -> &SkillTrack {
        match id {
            SkillId::PhishingDetection => &self.phishing_detection,
            SkillId::ContractAnalysis => &self.contract_analysis,
            SkillId::SocialEngineering => &self.social_engineering,
            SkillId::TechnicalAuditing => &self.technical_auditing,
        }
    }

    pub const fn track_mut(&mut self, id: SkillId) -> &mut SkillTrack {
        match id {
            SkillId::PhishingDetection => &mut self.phishing_detection,
            SkillId::ContractAnalysis => &mut self.contract_analysis,
            SkillId::SocialEngineering => &mut self.social_engineering,
            SkillId::TechnicalAuditing => &mut self.technical_auditing,
        }
    }

    /// Iterate the tracks in display order.
    pub fn iter(&self) -> impl Iterator<Item = (SkillId, &SkillTrack)> {
        SkillId::ALL.iter().map(|id| (*id, self.track(*id)))
    }
}

/// Result of an XP grant: how progression advanced as a side effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XpGrant {
    /// Player levels gained. A single grant can cross several thresholds.
    pub levels_gained: u32,
    /// Skill that leveled up from this grant, if any.
    pub skill_leveled: Option<SkillId>,
}

/// Result of recording an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerTally {
    /// True when an incorrect answer ended a non-zero streak.
    pub streak_broken: bool,
}

/// Mutable record of one session's score, streak, skills, and achievements.
///
/// Created fresh at session start and discarded on restart; all counters are
/// monotonic within a session except `streak`, which resets to zero on any
/// incorrect answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionLedger {
    /// 0-based index into the active scenario set. Monotonically increasing.
    pub scenario_index: usize,
    pub xp: u32,
    pub level: u32,
    pub streak: u32,
    pub max_streak: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub tools_used: u32,
    /// Active-set indices of answered scenarios, in answer order.
    pub completed: Vec<usize>,
    /// Unlocked achievement ids, in unlock order. Each appears at most once.
    pub unlocked: Vec<AchievementId>,
    pub skills: SkillSet,
}

impl Default for ProgressionLedger {
    fn default() -> Self {
        Self {
            scenario_index: 0,
            xp: 0,
            level: 1,
            streak: 0,
            max_streak: 0,
            correct_answers: 0,
            incorrect_answers: 0,
            tools_used: 0,
            completed: Vec::new(),
            unlocked: Vec::new(),
            skills: SkillSet::default(),
        }
    }
}

impl ProgressionLedger {
    /// Reinitialize every counter and track to its fresh-session value.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Accumulate XP, cascading player level-ups across every crossed
    /// `level * 500` threshold, and credit the optional skill track.
    ///
    /// Skill overflow on level-up is discarded (XP resets to zero) and the
    /// next threshold grows to `floor(old * 1.5)`.
    pub fn add_xp(&mut self, amount: u32, skill: Option<SkillId>) -> XpGrant {
        self.xp = self.xp.saturating_add(amount);

        let mut levels_gained = 0;
        while self.xp >= self.level.saturating_mul(LEVEL_XP_STEP) {
            self.level += 1;
            levels_gained += 1;
        }

        let mut skill_leveled = None;
        if let Some(id) = skill {
            let track = self.skills.track_mut(id);
            track.xp = track.xp.saturating_add(amount);
            if track.xp >= track.next_level_xp {
                track.level += 1;
                track.xp = 0;
                track.next_level_xp = track.next_level_xp.saturating_mul(3) / 2;
                skill_leveled = Some(id);
            }
        }

        XpGrant {
            levels_gained,
            skill_leveled,
        }
    }

    /// Record an answer outcome: tallies, streak, and high-water mark.
    pub fn record_answer(&mut self, correct: bool) -> AnswerTally {
        if correct {
            self.correct_answers += 1;
            self.streak += 1;
            if self.streak > self.max_streak {
                self.max_streak = self.streak;
            }
            AnswerTally {
                streak_broken: false,
            }
        } else {
            self.incorrect_answers += 1;
            let streak_broken = self.streak > 0;
            self.streak = 0;
            AnswerTally { streak_broken }
        }
    }

    pub fn record_tool_use(&mut self) {
        self.tools_used += 1;
    }

    /// Append an answered scenario's active-set index to the completed list.
    pub fn mark_completed(&mut self, active_index: usize) {
        self.completed.push(active_index);
    }

    /// Move to the next scenario index.
    pub fn advance_scenario(&mut self) {
        self.scenario_index += 1;
    }

    #[must_use]
    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }

    /// Unlock an achievement once, crediting its XP reward unskilled.
    /// Returns false without mutation when the id is already unlocked.
    pub fn unlock(&mut self, id: AchievementId, xp_reward: u32) -> bool {
        if self.is_unlocked(id) {
            return false;
        }
        self.unlocked.push(id);
        self.add_xp(xp_reward, None);
        true
    }
}
