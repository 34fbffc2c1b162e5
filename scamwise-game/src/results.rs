//! End-of-session results summarizer. Pure and idempotent: the same ledger
//! always produces the same report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::achievements::AchievementId;
use crate::ledger::{ProgressionLedger, SkillId};

/// Final standing awarded for a session, in descending order of merit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    BlockchainGuardian,
    SecurityExpert,
    VigilantUser,
    AtRisk,
}

impl Rank {
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::BlockchainGuardian => "BLOCKCHAIN GUARDIAN",
            Self::SecurityExpert => "SECURITY EXPERT",
            Self::VigilantUser => "VIGILANT USER",
            Self::AtRisk => "AT RISK",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::BlockchainGuardian => {
                "Perfect score! You're ready to protect yourself and others from crypto scams. \
                 Share your knowledge!"
            }
            Self::SecurityExpert => {
                "Excellent work! You have strong scam detection skills. Review the missed \
                 scenarios to reach perfection."
            }
            Self::VigilantUser => {
                "Good job! You're developing solid instincts. Keep practicing to become an \
                 expert."
            }
            Self::AtRisk => {
                "You need more practice. These scams are real and costly. Go through the \
                 scenarios again carefully."
            }
        }
    }

    /// First-match rank selection over the accuracy thresholds.
    #[must_use]
    pub const fn for_accuracy(accuracy: u32, incorrect: u32) -> Self {
        if accuracy == 100 && incorrect == 0 {
            Self::BlockchainGuardian
        } else if accuracy >= 85 {
            Self::SecurityExpert
        } else if accuracy >= 70 {
            Self::VigilantUser
        } else {
            Self::AtRisk
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Per-skill progress line for the results screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillProgress {
    pub skill: SkillId,
    pub level: u32,
    /// Progress toward the next skill level in `[0, 1)`.
    pub ratio: f32,
}

/// Statistics snapshot produced once a session completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsReport {
    pub rank: Rank,
    pub message: String,
    /// Percentage of the active set answered correctly, rounded to the
    /// nearest integer. Zero for an empty session.
    pub accuracy: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub max_streak: u32,
    pub tools_used: u32,
    pub elapsed_secs: u64,
    pub xp: u32,
    pub level: u32,
    pub unlocked: Vec<AchievementId>,
    pub skills: Vec<SkillProgress>,
}

impl ResultsReport {
    /// Plain-text summary for the share/copy button.
    #[must_use]
    pub fn share_text(&self) -> String {
        format!(
            "Scamwise Training Results:\n\nAccuracy: {}%\nDetected: {}\nMissed: {}\nBest \
             Streak: {}\nLevel: {}\nXP: {}",
            self.accuracy, self.correct, self.incorrect, self.max_streak, self.level, self.xp
        )
    }
}

/// Summarize a completed session. Has no side effects.
#[must_use]
pub fn summarize(
    ledger: &ProgressionLedger,
    active_len: usize,
    elapsed: Duration,
) -> ResultsReport {
    let accuracy = if active_len == 0 {
        0
    } else {
        let ratio = f64::from(ledger.correct_answers) / active_len as f64;
        (ratio * 100.0).round() as u32
    };
    let rank = Rank::for_accuracy(accuracy, ledger.incorrect_answers);

    let skills = ledger
        .skills
        .iter()
        .map(|(skill, track)| SkillProgress {
            skill,
            level: track.level,
            ratio: track.progress_ratio(),
        })
        .collect();

    ResultsReport {
        rank,
        message: rank.message().to_string(),
        accuracy,
        correct: ledger.correct_answers,
        incorrect: ledger.incorrect_answers,
        max_streak: ledger.max_streak,
        tools_used: ledger.tools_used,
        elapsed_secs: elapsed.as_secs(),
        xp: ledger.xp,
        level: ledger.level,
        unlocked: ledger.unlocked.clone(),
        skills,
    }
}
