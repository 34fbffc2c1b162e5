use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::ledger::SkillId;
use crate::tools::ToolId;

/// Threat category a scenario belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wallet,
    Defi,
    Nft,
    Layer2,
    Social,
    Stablecoin,
    Mev,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wallet => "wallet",
            Self::Defi => "defi",
            Self::Nft => "nft",
            Self::Layer2 => "layer2",
            Self::Social => "social",
            Self::Stablecoin => "stablecoin",
            Self::Mev => "mev",
        }
    }

    /// Skill track credited when a scenario of this category is answered
    /// correctly. Categories without a dedicated track fall back to
    /// phishing detection.
    #[must_use]
    pub const fn skill(self) -> SkillId {
        match self {
            Self::Defi => SkillId::ContractAnalysis,
            Self::Social => SkillId::SocialEngineering,
            Self::Nft | Self::Layer2 => SkillId::TechnicalAuditing,
            Self::Wallet | Self::Stablecoin | Self::Mev => SkillId::PhishingDetection,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty tier of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(()),
        }
    }
}

/// One selectable answer for a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
}

/// A single message within a chat-type scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Rendering-side alignment hint (`them`, `you`, ...). Opaque to the core.
    pub sender: String,
    #[serde(default)]
    pub from: Option<String>,
    pub text: String,
    #[serde(default)]
    pub time: String,
}

/// Labelled display field within a transaction artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxField {
    pub label: String,
    pub value: String,
}

/// Simulated transaction approval request shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TxSummary {
    /// Recipient address; the analysis target for investigation tools.
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub fields: Vec<TxField>,
    #[serde(default)]
    pub decoded_function: Option<String>,
    #[serde(default)]
    pub decoded_params: Vec<TxField>,
}

/// The artifact a scenario presents to the player. Opaque to the runner
/// except for investigation-tool target derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Presentation {
    #[serde(rename_all = "camelCase")]
    Email {
        from: String,
        to: String,
        subject: String,
        body: String,
    },
    #[serde(rename_all = "camelCase")]
    Website { url: String, content: String },
    #[serde(rename_all = "camelCase")]
    Transaction {
        #[serde(default)]
        tx_data: TxSummary,
    },
    #[serde(rename_all = "camelCase")]
    Chat { messages: Vec<ChatMessage> },
}

/// Feedback shown after a scenario is answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub correct: String,
    pub incorrect: String,
    pub xp_reward: u32,
    #[serde(default)]
    pub red_flags: Vec<String>,
    /// Background notes for the feedback panel (`blockchainInfo` in legacy
    /// data files).
    #[serde(default, alias = "blockchainInfo")]
    pub context: Vec<String>,
}

/// Tool list capacity stored inline without additional allocations.
pub type ToolList = SmallVec<[ToolId; 4]>;

/// One quiz unit: a simulated artifact plus a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: u32,
    pub category: Category,
    pub difficulty: Difficulty,
    pub title: String,
    #[serde(flatten)]
    pub presentation: Presentation,
    pub question: String,
    pub options: Vec<AnswerOption>,
    /// Option id the scenario treats as correct. Compared case-sensitively,
    /// no normalization.
    #[serde(alias = "correctAnswer")]
    pub correct_option: String,
    #[serde(default)]
    pub tools: ToolList,
    pub feedback: Feedback,
}

impl Scenario {
    /// Whether `option_id` is one of this scenario's selectable options.
    #[must_use]
    pub fn has_option(&self, option_id: &str) -> bool {
        self.options.iter().any(|opt| opt.id == option_id)
    }
}

/// Validation failures for a scenario repository.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataError {
    #[error("scenario {0} has no answer options")]
    NoOptions(u32),
    #[error("scenario {0} declares correct option `{1}` which is not among its options")]
    MissingCorrectOption(u32, String),
    #[error("scenario {0} has a zero XP reward")]
    ZeroXpReward(u32),
    #[error("scenario id {0} appears more than once")]
    DuplicateId(u32),
}

/// Immutable, ordered collection of scenario records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScenarioData {
    pub scenarios: Vec<Scenario>,
}

impl ScenarioData {
    /// Create an empty repository (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            scenarios: Vec::new(),
        }
    }

    /// Load scenario data from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid scenario data.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Create scenario data from pre-parsed records.
    #[must_use]
    pub fn from_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.get(index)
    }

    /// Number of scenarios carrying the given category tag.
    #[must_use]
    pub fn count_in_category(&self, category: Category) -> usize {
        self.scenarios
            .iter()
            .filter(|s| s.category == category)
            .count()
    }

    /// Check the repository invariants: every correct option exists, every
    /// XP reward is positive, and scenario ids are unique.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), DataError> {
        let mut seen = HashSet::new();
        for scenario in &self.scenarios {
            if scenario.options.is_empty() {
                return Err(DataError::NoOptions(scenario.id));
            }
            if !scenario.has_option(&scenario.correct_option) {
                return Err(DataError::MissingCorrectOption(
                    scenario.id,
                    scenario.correct_option.clone(),
                ));
            }
            if scenario.feedback.xp_reward == 0 {
                return Err(DataError::ZeroXpReward(scenario.id));
            }
            if !seen.insert(scenario.id) {
                return Err(DataError::DuplicateId(scenario.id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_scenario(id: u32) -> Scenario {
        Scenario {
            id,
            category: Category::Wallet,
            difficulty: Difficulty::Easy,
            title: format!("Scenario {id}"),
            presentation: Presentation::Website {
                url: "https://example.com".into(),
                content: String::new(),
            },
            question: "Scam or legit?".into(),
            options: vec![
                AnswerOption {
                    id: "scam".into(),
                    text: "Scam".into(),
                },
                AnswerOption {
                    id: "legit".into(),
                    text: "Legit".into(),
                },
            ],
            correct_option: "scam".into(),
            tools: ToolList::new(),
            feedback: Feedback {
                correct: "Yes.".into(),
                incorrect: "No.".into(),
                xp_reward: 100,
                red_flags: Vec::new(),
                context: Vec::new(),
            },
        }
    }

    #[test]
    fn scenario_data_parses_legacy_field_names() {
        let json = r#"{
            "scenarios": [
                {
                    "id": 1,
                    "category": "wallet",
                    "difficulty": "easy",
                    "type": "email",
                    "title": "MetaMask Phishing Email",
                    "from": "security@metamask-support.com",
                    "to": "you@email.com",
                    "subject": "URGENT: Verify Your Wallet",
                    "body": "Click here to verify.",
                    "question": "Is this email legitimate or a scam?",
                    "correctAnswer": "scam",
                    "options": [
                        { "id": "legit", "text": "Legitimate" },
                        { "id": "scam", "text": "Scam" }
                    ],
                    "tools": ["urlAnalyzer", "domainLookup"],
                    "feedback": {
                        "correct": "Classic phishing.",
                        "incorrect": "This is phishing.",
                        "xpReward": 100,
                        "redFlags": ["Requests seed phrase"],
                        "blockchainInfo": ["Seed phrases are master keys"]
                    }
                }
            ]
        }"#;

        let data = ScenarioData::from_json(json).unwrap();
        assert_eq!(data.len(), 1);
        let scenario = &data.scenarios[0];
        assert_eq!(scenario.category, Category::Wallet);
        assert_eq!(scenario.correct_option, "scam");
        assert_eq!(
            scenario.tools.as_slice(),
            [ToolId::UrlScanner, ToolId::AddressLookup]
        );
        assert_eq!(scenario.feedback.xp_reward, 100);
        assert_eq!(scenario.feedback.context.len(), 1);
        assert!(matches!(scenario.presentation, Presentation::Email { .. }));
        data.validate().unwrap();
    }

    #[test]
    fn validate_rejects_missing_correct_option() {
        let mut scenario = minimal_scenario(7);
        scenario.correct_option = "nope".into();
        let data = ScenarioData::from_scenarios(vec![scenario]);
        assert_eq!(
            data.validate(),
            Err(DataError::MissingCorrectOption(7, "nope".into()))
        );
    }

    #[test]
    fn validate_rejects_zero_reward_and_duplicate_ids() {
        let mut zero = minimal_scenario(1);
        zero.feedback.xp_reward = 0;
        let data = ScenarioData::from_scenarios(vec![zero]);
        assert_eq!(data.validate(), Err(DataError::ZeroXpReward(1)));

        let dup = ScenarioData::from_scenarios(vec![minimal_scenario(2), minimal_scenario(2)]);
        assert_eq!(dup.validate(), Err(DataError::DuplicateId(2)));
    }

    #[test]
    fn category_skill_mapping_is_exhaustive() {
        assert_eq!(Category::Defi.skill(), SkillId::ContractAnalysis);
        assert_eq!(Category::Social.skill(), SkillId::SocialEngineering);
        assert_eq!(Category::Nft.skill(), SkillId::TechnicalAuditing);
        assert_eq!(Category::Layer2.skill(), SkillId::TechnicalAuditing);
        assert_eq!(Category::Wallet.skill(), SkillId::PhishingDetection);
        assert_eq!(Category::Stablecoin.skill(), SkillId::PhishingDetection);
        assert_eq!(Category::Mev.skill(), SkillId::PhishingDetection);
    }
}
